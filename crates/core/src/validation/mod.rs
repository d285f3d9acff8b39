//! Submission validation.
//!
//! Pure validator functions, one per data facet, plus the
//! [`ValidationOutcome`] a step gate hands back to the UI. Nothing in here
//! touches the wizard state.

pub mod outcome;
pub mod validators;

pub use outcome::{DraftField, ValidationOutcome};
pub use validators::{
    validate_abstract, validate_authors, validate_checklist, validate_file, validate_references,
    validate_title, word_count,
};
