//! The submission wizard state machine.
//!
//! [`StepSequencer`] owns the [`SubmissionDraft`] and is the only component
//! that moves between steps. Forward moves are gated by
//! [`gate::evaluate_step`]; backward moves are free. Finishing assembles the
//! draft and hands it to a [`SubmissionClient`], guarding against a second
//! dispatch while the first is outstanding.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::assembler::{self, AssemblyError, Submission};
use crate::client::{PersistedId, SubmissionClient, SubmitError, Submitter};
use crate::config::SubmissionRules;
use crate::draft::SubmissionDraft;
use crate::error::CoreError;
use crate::forms::{MetadataForm, StartForm, SupplementaryForm, UploadForm};
use crate::gate;
use crate::types::Timestamp;
use crate::validation::{DraftField, ValidationOutcome};

// ---------------------------------------------------------------------------
// Wizard steps
// ---------------------------------------------------------------------------

/// The five steps of the submission wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Start,
    Upload,
    Metadata,
    Supplementary,
    Confirmation,
}

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 5;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 5;

impl WizardStep {
    pub const ALL: [WizardStep; TOTAL_STEPS as usize] = [
        Self::Start,
        Self::Upload,
        Self::Metadata,
        Self::Supplementary,
        Self::Confirmation,
    ];

    /// Convert a 1-based step number to a `WizardStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Start),
            2 => Ok(Self::Upload),
            3 => Ok(Self::Metadata),
            4 => Ok(Self::Supplementary),
            5 => Ok(Self::Confirmation),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Start => 1,
            Self::Upload => 2,
            Self::Metadata => 3,
            Self::Supplementary => 4,
            Self::Confirmation => 5,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Upload => "Upload Submission",
            Self::Metadata => "Enter Metadata",
            Self::Supplementary => "Upload Supplementary Files",
            Self::Confirmation => "Confirmation",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Upload => "upload",
            Self::Metadata => "metadata",
            Self::Supplementary => "supplementary",
            Self::Confirmation => "confirmation",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.to_number() + 1).ok()
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.to_number().checked_sub(1)?).ok()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Wizard state
// ---------------------------------------------------------------------------

/// Where the wizard is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WizardState {
    /// A step is on screen and accepts input.
    Active { step: WizardStep },
    /// An assembled submission is with the client; nothing may change.
    Dispatching {
        submission_id: Uuid,
        submitted_at: Timestamp,
    },
    /// Terminal: the submission was persisted.
    Done {
        submission_id: Uuid,
        persisted_id: PersistedId,
    },
    /// Terminal: the user cancelled and the draft was discarded.
    Cancelled,
    /// Terminal: the client reported a non-retryable failure.
    Aborted { reason: String },
}

impl WizardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active { .. } => "active",
            Self::Dispatching { .. } => "dispatching",
            Self::Done { .. } => "done",
            Self::Cancelled => "cancelled",
            Self::Aborted { .. } => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Cancelled | Self::Aborted { .. }
        )
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active { step } => write!(f, "active at {step}"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Results and errors
// ---------------------------------------------------------------------------

/// Misuse of the sequencer. None of these change wizard state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Step '{required}' is not active (wizard is {current})")]
    StepNotActive {
        required: WizardStep,
        current: WizardState,
    },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Confirmation is the final step; finish the submission instead")]
    AtFinalStep,

    #[error("A submission is being dispatched")]
    DispatchInFlight,

    #[error("Wizard session is {0}")]
    Closed(&'static str),
}

/// Result of [`StepSequencer::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The gate passed and the wizard moved forward. Non-blocking warnings
    /// from the gate are passed along.
    Moved {
        from: WizardStep,
        to: WizardStep,
        warnings: Vec<String>,
    },
    /// The gate failed; the wizard did not move.
    Blocked(ValidationOutcome),
}

/// Returned when a submission has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishReceipt {
    pub submission_id: Uuid,
    pub persisted_id: PersistedId,
    pub submitted_at: Timestamp,
}

/// Why [`StepSequencer::finish`] did not complete.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinishError {
    #[error("Submission can only be finished from the confirmation step (wizard is {current})")]
    NotAtConfirmation { current: WizardState },

    #[error("A submission is already being dispatched")]
    AlreadyDispatching,

    #[error("Submission was already persisted as {persisted_id}")]
    AlreadySubmitted { persisted_id: PersistedId },

    #[error("Wizard session is {0}")]
    Closed(&'static str),

    #[error("No dispatch is outstanding")]
    NotDispatching,

    /// Internal defect; the wizard stays at confirmation.
    #[error("Submission could not be assembled: {0}")]
    Assembly(#[from] AssemblyError),

    /// The server rejected fields; the wizard stays at confirmation.
    #[error("Submission was rejected by the server")]
    Rejected(ValidationOutcome),

    /// Retryable; call `finish` again.
    #[error("Submission could not be delivered, please retry: {0}")]
    Transient(String),

    /// The session has been aborted.
    #[error("Submission failed permanently: {0}")]
    Fatal(String),
}

impl FinishError {
    /// Whether calling `finish` again, unchanged, may succeed. A rejection
    /// needs the author to retreat and correct fields first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Shown when the server rejects a submission without naming any field.
const GENERIC_REJECTION: &str = "The submission was rejected; please review it and try again";

/// Drives one wizard session for one user.
///
/// Not `Clone`: each draft has exactly one dispatch guard.
///
/// ```compile_fail
/// use manuscript_core::{StepSequencer, SubmissionRules, Submitter};
///
/// let seq = StepSequencer::new(Submitter::new(1, "ana@uni.edu"), SubmissionRules::default());
/// let copy = seq.clone();
/// ```
#[derive(Debug)]
pub struct StepSequencer {
    state: WizardState,
    draft: SubmissionDraft,
    rules: SubmissionRules,
    submitter: Submitter,
    last_outcome: Option<ValidationOutcome>,
}

impl StepSequencer {
    /// Start a new session at the first step with an empty draft.
    pub fn new(submitter: Submitter, rules: SubmissionRules) -> Self {
        tracing::debug!(user_id = submitter.user_id, "Submission wizard started");
        Self {
            state: WizardState::Active {
                step: WizardStep::Start,
            },
            draft: SubmissionDraft::new(),
            rules,
            submitter,
            last_outcome: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// The step on screen, if the wizard is accepting input.
    pub fn current_step(&self) -> Option<WizardStep> {
        match self.state {
            WizardState::Active { step } => Some(step),
            _ => None,
        }
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn rules(&self) -> &SubmissionRules {
        &self.rules
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    /// The outcome of the last blocked transition or server rejection, until
    /// the wizard moves.
    pub fn last_outcome(&self) -> Option<&ValidationOutcome> {
        self.last_outcome.as_ref()
    }

    // -- step editors --

    pub fn start_form(&mut self) -> Result<StartForm<'_>, WizardError> {
        self.require_step(WizardStep::Start)?;
        Ok(StartForm::new(&mut self.draft))
    }

    pub fn upload_form(&mut self) -> Result<UploadForm<'_>, WizardError> {
        self.require_step(WizardStep::Upload)?;
        Ok(UploadForm::new(&mut self.draft, &self.rules))
    }

    pub fn metadata_form(&mut self) -> Result<MetadataForm<'_>, WizardError> {
        self.require_step(WizardStep::Metadata)?;
        Ok(MetadataForm::new(&mut self.draft))
    }

    pub fn supplementary_form(&mut self) -> Result<SupplementaryForm<'_>, WizardError> {
        self.require_step(WizardStep::Supplementary)?;
        Ok(SupplementaryForm::new(&mut self.draft))
    }

    // -- navigation --

    /// Run the current step's gate and move forward if it passes.
    pub fn advance(&mut self) -> Result<Advance, WizardError> {
        let from = self.active_step()?;
        let to = from.next().ok_or(WizardError::AtFinalStep)?;

        let outcome = gate::evaluate_step(from, &self.draft, &self.rules);
        if !outcome.is_passing() {
            tracing::warn!(
                step = %from,
                errors = outcome.errors.len(),
                "Wizard transition blocked"
            );
            self.last_outcome = Some(outcome.clone());
            return Ok(Advance::Blocked(outcome));
        }

        tracing::info!(from = %from, to = %to, "Wizard advanced");
        self.state = WizardState::Active { step: to };
        self.last_outcome = None;
        Ok(Advance::Moved {
            from,
            to,
            warnings: outcome.warnings,
        })
    }

    /// Go back one step. Entered data is kept and nothing is re-validated.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let from = self.active_step()?;
        let to = from.previous().ok_or(WizardError::AtFirstStep)?;
        tracing::info!(from = %from, to = %to, "Wizard retreated");
        self.state = WizardState::Active { step: to };
        self.last_outcome = None;
        Ok(to)
    }

    /// Discard the draft and close the session.
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        self.active_step()?;
        tracing::info!(user_id = self.submitter.user_id, "Submission wizard cancelled");
        self.state = WizardState::Cancelled;
        self.draft = SubmissionDraft::new();
        self.last_outcome = None;
        Ok(())
    }

    // -- finishing --

    /// Assemble and dispatch the submission through `client`.
    ///
    /// The sequencer is in [`WizardState::Dispatching`] for the duration of
    /// the client call. Dropping the returned future mid-call leaves it
    /// there; [`SubmissionSession`](crate::session::SubmissionSession) runs
    /// the client call on its own task to avoid that.
    pub async fn finish<C>(&mut self, client: &C) -> Result<FinishReceipt, FinishError>
    where
        C: SubmissionClient + ?Sized,
    {
        let submission = self.begin_finish()?;
        let result = client.submit(submission).await;
        self.complete_finish(result)
    }

    /// First half of [`finish`](Self::finish): assemble the draft and enter
    /// the dispatching state. A second call before
    /// [`complete_finish`](Self::complete_finish) is refused.
    pub fn begin_finish(&mut self) -> Result<Submission, FinishError> {
        match &self.state {
            WizardState::Active {
                step: WizardStep::Confirmation,
            } => {}
            WizardState::Active { .. } => {
                return Err(FinishError::NotAtConfirmation {
                    current: self.state.clone(),
                })
            }
            WizardState::Dispatching { .. } => return Err(FinishError::AlreadyDispatching),
            WizardState::Done { persisted_id, .. } => {
                return Err(FinishError::AlreadySubmitted {
                    persisted_id: persisted_id.clone(),
                })
            }
            closed => return Err(FinishError::Closed(closed.as_str())),
        }

        let submission = match assembler::assemble(&self.draft, &self.submitter) {
            Ok(submission) => submission,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    user_id = self.submitter.user_id,
                    "Submission assembly failed after all gates passed; this is a defect"
                );
                return Err(FinishError::Assembly(err));
            }
        };

        tracing::info!(
            submission_id = %submission.id(),
            user_id = self.submitter.user_id,
            "Dispatching submission"
        );
        self.state = WizardState::Dispatching {
            submission_id: submission.id(),
            submitted_at: submission.created_at(),
        };
        self.last_outcome = None;
        Ok(submission)
    }

    /// Second half of [`finish`](Self::finish): record the client's answer.
    ///
    /// Success closes the session. Server rejections and transient failures
    /// return to the confirmation step; fatal failures abort the session.
    pub fn complete_finish(
        &mut self,
        result: Result<PersistedId, SubmitError>,
    ) -> Result<FinishReceipt, FinishError> {
        let WizardState::Dispatching {
            submission_id,
            submitted_at,
        } = self.state
        else {
            return Err(FinishError::NotDispatching);
        };

        match result {
            Ok(persisted_id) => {
                tracing::info!(
                    submission_id = %submission_id,
                    persisted_id = %persisted_id,
                    "Submission persisted"
                );
                self.state = WizardState::Done {
                    submission_id,
                    persisted_id: persisted_id.clone(),
                };
                Ok(FinishReceipt {
                    submission_id,
                    persisted_id,
                    submitted_at,
                })
            }
            Err(SubmitError::ValidationRejected { field_errors }) => {
                let mut outcome = ValidationOutcome::from_external(
                    field_errors.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                );
                if outcome.is_passing() {
                    outcome.error(DraftField::Submission, GENERIC_REJECTION);
                }
                tracing::warn!(
                    submission_id = %submission_id,
                    errors = outcome.errors.len(),
                    "Submission rejected by server"
                );
                self.return_to_confirmation();
                self.last_outcome = Some(outcome.clone());
                Err(FinishError::Rejected(outcome))
            }
            Err(SubmitError::TransientFailure(message)) => {
                tracing::warn!(
                    submission_id = %submission_id,
                    error = %message,
                    "Submission dispatch failed, retryable"
                );
                self.return_to_confirmation();
                Err(FinishError::Transient(message))
            }
            Err(SubmitError::Fatal(message)) => {
                tracing::error!(
                    submission_id = %submission_id,
                    error = %message,
                    "Submission dispatch failed permanently"
                );
                self.state = WizardState::Aborted {
                    reason: message.clone(),
                };
                Err(FinishError::Fatal(message))
            }
        }
    }

    // -- helpers --

    fn return_to_confirmation(&mut self) {
        self.state = WizardState::Active {
            step: WizardStep::Confirmation,
        };
    }

    fn active_step(&self) -> Result<WizardStep, WizardError> {
        match &self.state {
            WizardState::Active { step } => Ok(*step),
            WizardState::Dispatching { .. } => Err(WizardError::DispatchInFlight),
            closed => Err(WizardError::Closed(closed.as_str())),
        }
    }

    fn require_step(&self, required: WizardStep) -> Result<(), WizardError> {
        match self.active_step()? {
            step if step == required => Ok(()),
            _ => Err(WizardError::StepNotActive {
                required,
                current: self.state.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::{StorageHandle, UploadedFile};
    use crate::authors::AuthorInput;
    use crate::config::MIME_PDF;
    use crate::draft::ChecklistItem;
    use std::collections::BTreeMap;

    fn sequencer() -> StepSequencer {
        StepSequencer::new(Submitter::new(1, "ana@uni.edu"), SubmissionRules::default())
    }

    fn pdf() -> UploadedFile {
        UploadedFile {
            file_name: "paper.pdf".into(),
            mime_type: MIME_PDF.into(),
            size_bytes: 1024,
            handle: StorageHandle::new("blob/1"),
        }
    }

    /// Walk a sequencer to the confirmation step with a valid draft.
    fn at_confirmation() -> StepSequencer {
        let mut seq = sequencer();
        {
            let mut form = seq.start_form().unwrap();
            for item in ChecklistItem::ALL {
                form.set_checklist_item(item, true);
            }
            form.set_copyright_agreed(true);
        }
        assert!(matches!(seq.advance().unwrap(), Advance::Moved { .. }));
        seq.upload_form().unwrap().attach_primary(pdf()).unwrap();
        assert!(matches!(seq.advance().unwrap(), Advance::Moved { .. }));
        {
            let mut form = seq.metadata_form().unwrap();
            form.set_title("A title");
            form.set_abstract("An abstract.");
            form.set_keywords("x; y");
            form.add_author(AuthorInput {
                first_name: "Ana".into(),
                last_name: "Lima".into(),
                email: "ana@uni.edu".into(),
                ..Default::default()
            });
        }
        assert!(matches!(seq.advance().unwrap(), Advance::Moved { .. }));
        assert!(matches!(seq.advance().unwrap(), Advance::Moved { .. }));
        assert_eq!(seq.current_step(), Some(WizardStep::Confirmation));
        seq
    }

    // -- WizardStep --

    #[test]
    fn step_numbers_roundtrip() {
        for n in MIN_STEP..=MAX_STEP {
            assert_eq!(WizardStep::from_number(n).unwrap().to_number(), n);
        }
        assert!(WizardStep::from_number(0).is_err());
        assert!(WizardStep::from_number(6).is_err());
    }

    #[test]
    fn next_and_previous_follow_linear_order() {
        assert_eq!(WizardStep::Start.previous(), None);
        assert_eq!(WizardStep::Start.next(), Some(WizardStep::Upload));
        assert_eq!(
            WizardStep::Confirmation.previous(),
            Some(WizardStep::Supplementary)
        );
        assert_eq!(WizardStep::Confirmation.next(), None);
        for pair in WizardStep::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].previous(), Some(pair[0]));
        }
    }

    #[test]
    fn step_labels_are_nonempty() {
        for step in WizardStep::ALL {
            assert!(!step.label().is_empty());
        }
    }

    // -- advance --

    #[test]
    fn blocked_advance_keeps_state_and_draft() {
        let mut seq = sequencer();
        let before = seq.draft().clone();
        let Advance::Blocked(outcome) = seq.advance().unwrap() else {
            panic!("expected the start gate to block");
        };
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(seq.current_step(), Some(WizardStep::Start));
        assert_eq!(seq.draft(), &before);
        assert_eq!(seq.last_outcome(), Some(&outcome));
    }

    #[test]
    fn successful_advance_clears_last_outcome() {
        let mut seq = sequencer();
        seq.advance().unwrap();
        assert!(seq.last_outcome().is_some());

        let mut form = seq.start_form().unwrap();
        for item in ChecklistItem::ALL {
            form.set_checklist_item(item, true);
        }
        form.set_copyright_agreed(true);

        assert_eq!(
            seq.advance().unwrap(),
            Advance::Moved {
                from: WizardStep::Start,
                to: WizardStep::Upload,
                warnings: Vec::new(),
            }
        );
        assert!(seq.last_outcome().is_none());
    }

    #[test]
    fn advance_from_confirmation_is_refused() {
        let mut seq = at_confirmation();
        assert_eq!(seq.advance().unwrap_err(), WizardError::AtFinalStep);
        assert_eq!(seq.current_step(), Some(WizardStep::Confirmation));
    }

    // -- retreat --

    #[test]
    fn retreat_from_start_is_refused() {
        let mut seq = sequencer();
        assert_eq!(seq.retreat().unwrap_err(), WizardError::AtFirstStep);
    }

    #[test]
    fn retreat_keeps_entered_data() {
        let mut seq = at_confirmation();
        let before = seq.draft().clone();
        assert_eq!(seq.retreat().unwrap(), WizardStep::Supplementary);
        assert_eq!(seq.retreat().unwrap(), WizardStep::Metadata);
        assert_eq!(seq.draft(), &before);
        assert_eq!(seq.metadata_form().unwrap().title(), "A title");
    }

    // -- forms --

    #[test]
    fn inactive_step_cannot_edit_the_draft() {
        let mut seq = sequencer();
        let err = seq.metadata_form().unwrap_err();
        assert!(matches!(
            err,
            WizardError::StepNotActive {
                required: WizardStep::Metadata,
                ..
            }
        ));
        assert!(seq.upload_form().is_err());
        assert!(seq.supplementary_form().is_err());
        assert!(seq.start_form().is_ok());
    }

    // -- cancel --

    #[test]
    fn cancel_discards_draft_and_closes_session() {
        let mut seq = at_confirmation();
        seq.cancel().unwrap();
        assert_eq!(seq.state(), &WizardState::Cancelled);
        assert_eq!(seq.draft(), &SubmissionDraft::new());
        assert_eq!(seq.advance().unwrap_err(), WizardError::Closed("cancelled"));
        assert_eq!(seq.retreat().unwrap_err(), WizardError::Closed("cancelled"));
        assert_eq!(seq.cancel().unwrap_err(), WizardError::Closed("cancelled"));
        assert_eq!(
            seq.begin_finish().unwrap_err(),
            FinishError::Closed("cancelled")
        );
    }

    // -- finish --

    #[test]
    fn finish_requires_confirmation_step() {
        let mut seq = sequencer();
        assert!(matches!(
            seq.begin_finish().unwrap_err(),
            FinishError::NotAtConfirmation { .. }
        ));
    }

    #[test]
    fn second_begin_finish_is_refused_while_dispatching() {
        let mut seq = at_confirmation();
        let submission = seq.begin_finish().unwrap();
        assert_eq!(
            seq.begin_finish().unwrap_err(),
            FinishError::AlreadyDispatching
        );
        assert_eq!(seq.retreat().unwrap_err(), WizardError::DispatchInFlight);
        assert_eq!(seq.cancel().unwrap_err(), WizardError::DispatchInFlight);
        assert!(matches!(
            seq.state(),
            WizardState::Dispatching { submission_id, .. } if *submission_id == submission.id()
        ));
    }

    #[test]
    fn successful_dispatch_closes_session() {
        let mut seq = at_confirmation();
        let submission = seq.begin_finish().unwrap();
        let receipt = seq
            .complete_finish(Ok(PersistedId::new("sub-1")))
            .unwrap();
        assert_eq!(receipt.submission_id, submission.id());
        assert_eq!(receipt.persisted_id.as_str(), "sub-1");
        assert!(seq.state().is_terminal());
        assert_eq!(
            seq.begin_finish().unwrap_err(),
            FinishError::AlreadySubmitted {
                persisted_id: PersistedId::new("sub-1")
            }
        );
    }

    #[test]
    fn transient_failure_returns_to_confirmation() {
        let mut seq = at_confirmation();
        seq.begin_finish().unwrap();
        let err = seq
            .complete_finish(Err(SubmitError::TransientFailure("timeout".into())))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(seq.current_step(), Some(WizardStep::Confirmation));
        assert!(seq.begin_finish().is_ok());
    }

    #[test]
    fn server_rejection_maps_to_field_errors() {
        let mut seq = at_confirmation();
        seq.begin_finish().unwrap();
        let err = seq
            .complete_finish(Err(SubmitError::ValidationRejected {
                field_errors: BTreeMap::from([(
                    "title".to_string(),
                    "A manuscript with this title already exists".to_string(),
                )]),
            }))
            .unwrap_err();
        assert!(!err.is_retryable());
        let FinishError::Rejected(outcome) = err else {
            panic!("expected a rejection");
        };
        assert!(outcome.error_for(DraftField::Title).is_some());
        assert_eq!(seq.current_step(), Some(WizardStep::Confirmation));
        assert_eq!(seq.last_outcome(), Some(&outcome));
    }

    #[test]
    fn empty_server_rejection_still_blocks() {
        let mut seq = at_confirmation();
        seq.begin_finish().unwrap();
        let err = seq
            .complete_finish(Err(SubmitError::ValidationRejected {
                field_errors: BTreeMap::new(),
            }))
            .unwrap_err();
        let FinishError::Rejected(outcome) = err else {
            panic!("expected a rejection");
        };
        assert_eq!(
            outcome.error_for(DraftField::Submission),
            Some(GENERIC_REJECTION)
        );
    }

    #[test]
    fn fatal_failure_aborts_session() {
        let mut seq = at_confirmation();
        seq.begin_finish().unwrap();
        let err = seq
            .complete_finish(Err(SubmitError::Fatal("journal closed".into())))
            .unwrap_err();
        assert_eq!(err, FinishError::Fatal("journal closed".into()));
        assert_eq!(
            seq.state(),
            &WizardState::Aborted {
                reason: "journal closed".into()
            }
        );
        assert_eq!(seq.advance().unwrap_err(), WizardError::Closed("aborted"));
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(FinishError::Transient("timeout".into()).is_retryable());
        assert!(!FinishError::Rejected(ValidationOutcome::new()).is_retryable());
        assert!(!FinishError::Fatal("gone".into()).is_retryable());
        assert!(!FinishError::AlreadyDispatching.is_retryable());
    }

    #[test]
    fn complete_without_dispatch_is_refused() {
        let mut seq = at_confirmation();
        assert_eq!(
            seq.complete_finish(Ok(PersistedId::new("x"))).unwrap_err(),
            FinishError::NotDispatching
        );
        assert_eq!(seq.current_step(), Some(WizardStep::Confirmation));
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let json = serde_json::to_value(WizardState::Active {
            step: WizardStep::Metadata,
        })
        .unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["step"], "metadata");
    }
}
