//! Tunable submission limits.
//!
//! [`SubmissionRules::default`] carries the product limits; deployments may
//! override the numeric ones through environment variables.

use crate::error::CoreError;

/// Default maximum number of whitespace-delimited words in a title.
pub const DEFAULT_MAX_TITLE_WORDS: usize = 20;

/// Default maximum number of whitespace-delimited words in an abstract.
pub const DEFAULT_MAX_ABSTRACT_WORDS: usize = 300;

/// Default maximum primary manuscript size (20 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_RTF: &str = "application/rtf";
/// Legacy RTF type still sent by some browsers.
pub const MIME_RTF_TEXT: &str = "text/rtf";

/// MIME types accepted for the primary manuscript file.
pub const DEFAULT_ACCEPTED_MIME_TYPES: &[&str] =
    &[MIME_PDF, MIME_DOC, MIME_DOCX, MIME_RTF, MIME_RTF_TEXT];

/// Limits applied by the validator set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRules {
    pub max_title_words: usize,
    pub max_abstract_words: usize,
    pub max_file_bytes: u64,
    pub accepted_mime_types: Vec<String>,
}

impl Default for SubmissionRules {
    fn default() -> Self {
        Self {
            max_title_words: DEFAULT_MAX_TITLE_WORDS,
            max_abstract_words: DEFAULT_MAX_ABSTRACT_WORDS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            accepted_mime_types: DEFAULT_ACCEPTED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl SubmissionRules {
    /// Load limits from environment variables, falling back to defaults.
    ///
    /// | Env Var                          | Default     |
    /// |----------------------------------|-------------|
    /// | `SUBMISSION_MAX_TITLE_WORDS`     | `20`        |
    /// | `SUBMISSION_MAX_ABSTRACT_WORDS`  | `300`       |
    /// | `SUBMISSION_MAX_FILE_BYTES`      | `20971520`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build rules from an arbitrary key lookup. Used by [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_title_words = parse_or(
            &lookup,
            "SUBMISSION_MAX_TITLE_WORDS",
            defaults.max_title_words,
        )?;
        let max_abstract_words = parse_or(
            &lookup,
            "SUBMISSION_MAX_ABSTRACT_WORDS",
            defaults.max_abstract_words,
        )?;
        let max_file_bytes = parse_or(
            &lookup,
            "SUBMISSION_MAX_FILE_BYTES",
            defaults.max_file_bytes,
        )?;

        Ok(Self {
            max_title_words,
            max_abstract_words,
            max_file_bytes,
            accepted_mime_types: defaults.accepted_mime_types,
        })
    }

    /// Whether `mime_type` is an accepted primary file type.
    ///
    /// Comparison ignores case and any `;`-separated parameters.
    pub fn accepts_mime_type(&self, mime_type: &str) -> bool {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.accepted_mime_types.iter().any(|m| *m == essence)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CoreError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
    }
}
