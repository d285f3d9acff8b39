//! A shareable wizard session.
//!
//! [`SubmissionSession`] wraps a [`StepSequencer`] behind an async mutex so
//! that several tasks (for example a double-clicked "Finish" button) can
//! drive the same wizard. The lock is never held across the client call;
//! the sequencer's dispatching state is what refuses a second finish.
//!
//! Dispatch runs on its own task, so a caller that stops waiting (timeout,
//! disconnect) does not strand the session in the dispatching state.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::SubmissionClient;
use crate::draft::SubmissionDraft;
use crate::events::{self, EventBus, WizardEvent};
use crate::types::DbId;
use crate::validation::ValidationOutcome;
use crate::wizard::{
    Advance, FinishError, FinishReceipt, StepSequencer, WizardError, WizardState, WizardStep,
};

pub struct SubmissionSession<C: ?Sized> {
    sequencer: Arc<Mutex<StepSequencer>>,
    client: Arc<C>,
    events: Option<Arc<EventBus>>,
}

impl<C> SubmissionSession<C>
where
    C: SubmissionClient + ?Sized + 'static,
{
    pub fn new(sequencer: StepSequencer, client: Arc<C>) -> Self {
        Self {
            sequencer: Arc::new(Mutex::new(sequencer)),
            client,
            events: None,
        }
    }

    /// Publish wizard events on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub async fn state(&self) -> WizardState {
        self.sequencer.lock().await.state().clone()
    }

    pub async fn current_step(&self) -> Option<WizardStep> {
        self.sequencer.lock().await.current_step()
    }

    /// A copy of the draft as it stands now.
    pub async fn draft(&self) -> SubmissionDraft {
        self.sequencer.lock().await.draft().clone()
    }

    pub async fn last_outcome(&self) -> Option<ValidationOutcome> {
        self.sequencer.lock().await.last_outcome().cloned()
    }

    /// Run `f` with exclusive access to the sequencer, typically to fill in
    /// the active step's form.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut StepSequencer) -> R) -> R {
        let mut sequencer = self.sequencer.lock().await;
        f(&mut sequencer)
    }

    pub async fn advance(&self) -> Result<Advance, WizardError> {
        let mut sequencer = self.sequencer.lock().await;
        let actor = sequencer.submitter().user_id;
        let from = sequencer.current_step();
        let result = sequencer.advance()?;
        drop(sequencer);

        let event = match &result {
            Advance::Moved { from, to, warnings } => WizardEvent::new(events::STEP_ADVANCED)
                .with_payload(serde_json::json!({
                    "from": from,
                    "to": to,
                    "warnings": warnings,
                })),
            Advance::Blocked(outcome) => WizardEvent::new(events::STEP_BLOCKED)
                .with_payload(serde_json::json!({
                    "step": from,
                    "errors": outcome.errors,
                })),
        };
        self.publish(event.with_actor(actor));
        Ok(result)
    }

    pub async fn retreat(&self) -> Result<WizardStep, WizardError> {
        let mut sequencer = self.sequencer.lock().await;
        let actor = sequencer.submitter().user_id;
        let from = sequencer.current_step();
        let to = sequencer.retreat()?;
        drop(sequencer);

        self.publish(
            WizardEvent::new(events::STEP_RETREATED)
                .with_actor(actor)
                .with_payload(serde_json::json!({ "from": from, "to": to })),
        );
        Ok(to)
    }

    pub async fn cancel(&self) -> Result<(), WizardError> {
        let mut sequencer = self.sequencer.lock().await;
        let actor = sequencer.submitter().user_id;
        sequencer.cancel()?;
        drop(sequencer);

        self.publish(WizardEvent::new(events::WIZARD_CANCELLED).with_actor(actor));
        Ok(())
    }

    /// Assemble the draft and dispatch it through the client.
    ///
    /// Only one call can be in flight; concurrent calls fail with
    /// [`FinishError::AlreadyDispatching`] and the client sees exactly one
    /// submission. The dispatch runs to completion even if this future is
    /// dropped; the outcome is then recorded in the session state.
    pub async fn finish(&self) -> Result<FinishReceipt, FinishError> {
        let (submission, actor) = {
            let mut sequencer = self.sequencer.lock().await;
            let actor = sequencer.submitter().user_id;
            match sequencer.begin_finish() {
                Ok(submission) => (submission, actor),
                Err(err) => {
                    if matches!(err, FinishError::Assembly(_)) {
                        publish_failure(self.events.as_deref(), &err, None, actor);
                    }
                    return Err(err);
                }
            }
        };

        let submission_id = submission.id();
        publish(
            self.events.as_deref(),
            WizardEvent::new(events::SUBMISSION_DISPATCHED)
                .with_submission(submission_id)
                .with_actor(actor),
        );

        let sequencer = Arc::clone(&self.sequencer);
        let client = Arc::clone(&self.client);
        let bus = self.events.clone();
        let dispatch = tokio::spawn(async move {
            let result = client.submit(submission).await;
            let finished = sequencer.lock().await.complete_finish(result);

            match &finished {
                Ok(receipt) => publish(
                    bus.as_deref(),
                    WizardEvent::new(events::SUBMISSION_COMPLETED)
                        .with_submission(submission_id)
                        .with_actor(actor)
                        .with_payload(serde_json::json!({
                            "persisted_id": receipt.persisted_id,
                        })),
                ),
                Err(err) => publish_failure(bus.as_deref(), err, Some(submission_id), actor),
            }
            finished
        });

        match dispatch.await {
            Ok(finished) => finished,
            Err(join_err) => {
                tracing::error!(
                    submission_id = %submission_id,
                    error = %join_err,
                    "Submission dispatch task failed"
                );
                Err(FinishError::Fatal(format!("dispatch task failed: {join_err}")))
            }
        }
    }

    fn publish(&self, event: WizardEvent) {
        publish(self.events.as_deref(), event);
    }
}

fn publish_failure(
    bus: Option<&EventBus>,
    err: &FinishError,
    submission_id: Option<Uuid>,
    actor: DbId,
) {
    let mut event = WizardEvent::new(events::SUBMISSION_FAILED)
        .with_actor(actor)
        .with_payload(serde_json::json!({
            "error": err.to_string(),
            "retryable": err.is_retryable(),
        }));
    if let Some(id) = submission_id {
        event = event.with_submission(id);
    }
    publish(bus, event);
}

fn publish(bus: Option<&EventBus>, event: WizardEvent) {
    if let Some(bus) = bus {
        bus.publish(event);
    }
}
