#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use manuscript_core::attachments::{StorageHandle, UploadedFile};
use manuscript_core::authors::AuthorInput;
use manuscript_core::config::{SubmissionRules, MIME_PDF};
use manuscript_core::draft::ChecklistItem;
use manuscript_core::{
    Advance, PersistedId, StepSequencer, Submission, SubmissionClient, SubmitError, Submitter,
    WizardStep,
};

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per test binary.
///
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=manuscript_core=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "manuscript_core=info".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn submitter() -> Submitter {
    Submitter::new(42, "ana.lima@uni.edu")
}

pub fn new_sequencer() -> StepSequencer {
    init_tracing();
    StepSequencer::new(submitter(), SubmissionRules::default())
}

pub fn pdf(name: &str, size_bytes: u64) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        mime_type: MIME_PDF.to_string(),
        size_bytes,
        handle: StorageHandle::new(format!("uploads/{name}")),
    }
}

pub fn author(first: &str, last: &str, email: &str) -> AuthorInput {
    AuthorInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        affiliation: "University".to_string(),
        ..Default::default()
    }
}

pub fn complete_start(seq: &mut StepSequencer) {
    let mut form = seq.start_form().expect("start step active");
    for item in ChecklistItem::ALL {
        form.set_checklist_item(item, true);
    }
    form.set_copyright_agreed(true);
}

pub fn complete_metadata(seq: &mut StepSequencer) {
    let mut form = seq.metadata_form().expect("metadata step active");
    form.set_title("Topological invariants of folded paper");
    form.set_abstract("We classify folds.");
    form.set_keywords("origami; topology");
    form.set_references("Doe, J. (2020). Folding.\n\nRoe, R. (2021). Creases.");
    form.add_author(author("Ana", "Lima", "ana.lima@uni.edu"));
}

fn expect_moved(seq: &mut StepSequencer, to: WizardStep) {
    match seq.advance().expect("advance allowed") {
        Advance::Moved { to: actual, .. } => assert_eq!(actual, to),
        Advance::Blocked(outcome) => panic!("blocked moving to {to}: {outcome:?}"),
    }
}

/// A sequencer sitting on the confirmation step with a valid draft.
pub fn sequencer_at_confirmation() -> StepSequencer {
    let mut seq = new_sequencer();
    complete_start(&mut seq);
    expect_moved(&mut seq, WizardStep::Upload);
    seq.upload_form()
        .expect("upload step active")
        .attach_primary(pdf("manuscript.pdf", 300_000))
        .expect("valid manuscript");
    expect_moved(&mut seq, WizardStep::Metadata);
    complete_metadata(&mut seq);
    expect_moved(&mut seq, WizardStep::Supplementary);
    expect_moved(&mut seq, WizardStep::Confirmation);
    seq
}

// ---------------------------------------------------------------------------
// Recording client
// ---------------------------------------------------------------------------

/// A [`SubmissionClient`] that records every submission it receives and
/// answers from a script, succeeding once the script runs out.
#[derive(Default)]
pub struct RecordingClient {
    calls: AtomicUsize,
    received: Mutex<Vec<Submission>>,
    script: Mutex<VecDeque<Result<PersistedId, SubmitError>>>,
    delay: Option<Duration>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the answer for the next unanswered call.
    pub fn then(self, answer: Result<PersistedId, SubmitError>) -> Self {
        self.script.lock().unwrap().push_back(answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Submission> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionClient for RecordingClient {
    async fn submit(&self, submission: Submission) -> Result<PersistedId, SubmitError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.received.lock().unwrap().push(submission);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(PersistedId::new(format!("MS-{n:04}"))))
    }
}
