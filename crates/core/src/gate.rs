//! Step gates: the per-step checks that decide whether the wizard may move
//! forward.
//!
//! A gate reads the draft and never changes it, so evaluating the same draft
//! twice yields the same outcome.

use crate::assembler::split_references;
use crate::config::SubmissionRules;
use crate::draft::SubmissionDraft;
use crate::validation::{
    validate_abstract, validate_authors, validate_checklist, validate_file, validate_references,
    validate_title, DraftField, ValidationOutcome,
};
use crate::wizard::WizardStep;

/// Shown on the metadata step when no keywords were entered.
pub const WARNING_NO_KEYWORDS: &str =
    "No keywords were entered; keywords help editors route the manuscript to reviewers";

/// Evaluate the gate for leaving `step` in the forward direction.
pub fn evaluate_step(
    step: WizardStep,
    draft: &SubmissionDraft,
    rules: &SubmissionRules,
) -> ValidationOutcome {
    match step {
        WizardStep::Start => start_gate(draft),
        WizardStep::Upload => upload_gate(draft, rules),
        WizardStep::Metadata => metadata_gate(draft, rules),
        // Optional step; nothing to check.
        WizardStep::Supplementary => ValidationOutcome::new(),
        // Terminal step; finishing goes through the assembler instead.
        WizardStep::Confirmation => ValidationOutcome::new(),
    }
}

fn start_gate(draft: &SubmissionDraft) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new();
    outcome.record(DraftField::Checklist, validate_checklist(&draft.checklist));
    if !draft.copyright_agreed {
        outcome.error(
            DraftField::Copyright,
            "You must agree to the copyright notice to continue",
        );
    }
    outcome
}

fn upload_gate(draft: &SubmissionDraft, rules: &SubmissionRules) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new();
    // Re-validated against the current rules, not just presence-checked.
    outcome.record(
        DraftField::PrimaryFile,
        validate_file(draft.attachments.primary(), rules),
    );
    outcome
}

fn metadata_gate(draft: &SubmissionDraft, rules: &SubmissionRules) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new();
    outcome.record(DraftField::Title, validate_title(&draft.title, rules));
    outcome.record(
        DraftField::Abstract,
        validate_abstract(&draft.abstract_text, rules),
    );
    outcome.record(DraftField::Authors, validate_authors(draft.authors.as_slice()));
    outcome.record(
        DraftField::References,
        validate_references(&split_references(&draft.references)),
    );
    if draft.keywords.trim().is_empty() {
        outcome.warn(WARNING_NO_KEYWORDS);
    }
    outcome
}
