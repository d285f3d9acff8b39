//! Manuscript submission workflow engine.
//!
//! Drives an author through a five-step wizard (start, upload, metadata,
//! supplementary files, confirmation), validates each step before the
//! author may move on, and assembles the collected draft into a
//! [`Submission`] handed to a [`SubmissionClient`]:
//!
//! - [`StepSequencer`]: the wizard state machine and sole owner of the draft.
//! - [`forms`]: step-scoped editors, the only way to change the draft.
//! - [`gate`] and [`validation`]: per-step checks and per-facet validators.
//! - [`assembler`]: draft to immutable submission.
//! - [`SubmissionSession`]: a shareable session that dispatches at most once.
//! - [`EventBus`]: wizard events for audit and notification subscribers.

pub mod assembler;
pub mod attachments;
pub mod authors;
pub mod client;
pub mod config;
pub mod draft;
pub mod error;
pub mod events;
pub mod forms;
pub mod gate;
pub mod session;
pub mod types;
pub mod validation;
pub mod wizard;

pub use assembler::{assemble, AssemblyError, Submission};
pub use client::{PersistedId, SubmissionClient, SubmitError, Submitter};
pub use config::SubmissionRules;
pub use draft::SubmissionDraft;
pub use error::CoreError;
pub use events::{EventBus, WizardEvent};
pub use session::SubmissionSession;
pub use validation::{DraftField, ValidationOutcome};
pub use wizard::{
    Advance, FinishError, FinishReceipt, StepSequencer, WizardError, WizardState, WizardStep,
};
