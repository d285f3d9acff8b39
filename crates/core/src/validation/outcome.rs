//! Field-keyed validation results.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Draft fields a violation can be reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Checklist,
    Copyright,
    PrimaryFile,
    Title,
    Abstract,
    Authors,
    Keywords,
    References,
    Agencies,
    Language,
    Comments,
    SupplementaryFiles,
    /// Problems that do not belong to a single field.
    Submission,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checklist => "checklist",
            Self::Copyright => "copyright",
            Self::PrimaryFile => "primary_file",
            Self::Title => "title",
            Self::Abstract => "abstract",
            Self::Authors => "authors",
            Self::Keywords => "keywords",
            Self::References => "references",
            Self::Agencies => "agencies",
            Self::Language => "language",
            Self::Comments => "comments",
            Self::SupplementaryFiles => "supplementary_files",
            Self::Submission => "submission",
        }
    }

    /// Map a field name reported by an external system onto a draft field.
    ///
    /// Accepts snake_case and camelCase spellings. Anything unrecognised is
    /// attributed to [`DraftField::Submission`].
    pub fn from_external_name(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "checklist" => Self::Checklist,
            "copyright" | "copyrightagreed" => Self::Copyright,
            "primaryfile" | "file" | "manuscript" => Self::PrimaryFile,
            "title" => Self::Title,
            "abstract" => Self::Abstract,
            "authors" | "author" => Self::Authors,
            "keywords" => Self::Keywords,
            "references" => Self::References,
            "agencies" => Self::Agencies,
            "language" => Self::Language,
            "comments" => Self::Comments,
            "supplementaryfiles" | "supplementary" => Self::SupplementaryFiles,
            _ => Self::Submission,
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one step gate evaluation.
///
/// `errors` block the transition, `warnings` never do. Multiple violations on
/// the same field are joined into one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub errors: BTreeMap<DraftField, String>,
    pub warnings: Vec<String>,
}

/// Separator used when a field collects more than one violation.
const MESSAGE_SEPARATOR: &str = "; ";

impl ValidationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the violations a validator returned for `field`.
    /// An empty list records nothing.
    pub fn record(&mut self, field: DraftField, violations: Vec<String>) {
        if violations.is_empty() {
            return;
        }
        let joined = violations.join(MESSAGE_SEPARATOR);
        self.errors
            .entry(field)
            .and_modify(|existing| {
                existing.push_str(MESSAGE_SEPARATOR);
                existing.push_str(&joined);
            })
            .or_insert(joined);
    }

    /// Record a single error message for `field`.
    pub fn error(&mut self, field: DraftField, message: impl Into<String>) {
        self.record(field, vec![message.into()]);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// `true` when nothing blocks the transition.
    pub fn is_passing(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: DraftField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Build an outcome from field errors reported by an external system.
    pub fn from_external<'a, I>(field_errors: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut outcome = Self::new();
        for (name, message) in field_errors {
            outcome.error(DraftField::from_external_name(name), message);
        }
        outcome
    }
}
