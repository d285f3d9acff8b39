//! Per-facet validators.
//!
//! Each function is total and side-effect free: it returns the list of
//! human-readable violations for its input, empty when the input is valid.
//! Output order is deterministic.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::attachments::FileDescriptor;
use crate::authors::Author;
use crate::config::SubmissionRules;
use crate::draft::Checklist;

/// `local@domain.tld` where the top-level domain is alphabetic or an
/// IDNA `xn--` label.
static EMAIL_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.(?:[A-Za-z]{2,}|xn--[A-Za-z0-9-]+)$").expect("valid regex")
});

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ---------------------------------------------------------------------------
// Text facets
// ---------------------------------------------------------------------------

/// Title must be present and at most `rules.max_title_words` words.
pub fn validate_title(title: &str, rules: &SubmissionRules) -> Vec<String> {
    validate_bounded_text("Title", title, rules.max_title_words)
}

/// Abstract must be present and at most `rules.max_abstract_words` words.
///
/// No minimum length is enforced.
pub fn validate_abstract(abstract_text: &str, rules: &SubmissionRules) -> Vec<String> {
    validate_bounded_text("Abstract", abstract_text, rules.max_abstract_words)
}

fn validate_bounded_text(label: &str, text: &str, max_words: usize) -> Vec<String> {
    let count = word_count(text);
    if count == 0 {
        return vec![format!("{label} is required")];
    }
    if count > max_words {
        return vec![format!(
            "{label} must be at most {max_words} words (currently {count})"
        )];
    }
    Vec::new()
}

/// Reference entries are accepted as given; no minimum count is enforced.
pub fn validate_references(_references: &[String]) -> Vec<String> {
    Vec::new()
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

/// Every author needs a first name, last name and well-formed email, and
/// one author must be the principal contact.
pub fn validate_authors(authors: &[Author]) -> Vec<String> {
    if authors.is_empty() {
        return vec!["At least one author is required".to_string()];
    }

    let mut violations = Vec::new();
    for (index, author) in authors.iter().enumerate() {
        let n = index + 1;
        if author.first_name.trim().is_empty() {
            violations.push(format!("Author {n}: first name is required"));
        }
        if author.last_name.trim().is_empty() {
            violations.push(format!("Author {n}: last name is required"));
        }
        let email = author.email.trim();
        if email.is_empty() {
            violations.push(format!("Author {n}: email is required"));
        } else if !is_valid_email(email) {
            violations.push(format!("Author {n}: email '{email}' is not a valid address"));
        }
    }

    if !authors.iter().any(|a| a.is_principal) {
        violations.push("One author must be marked as principal contact".to_string());
    }

    violations
}

fn is_valid_email(email: &str) -> bool {
    email.validate_email() && EMAIL_SHAPE_RE.is_match(email)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Primary manuscript file must be present, of an accepted type, and no
/// larger than `rules.max_file_bytes`.
pub fn validate_file<F: FileDescriptor>(file: Option<&F>, rules: &SubmissionRules) -> Vec<String> {
    let Some(file) = file else {
        return vec!["A manuscript file is required".to_string()];
    };

    let mut violations = Vec::new();
    if !rules.accepts_mime_type(file.mime_type()) {
        violations.push(format!(
            "File '{}' has unsupported type '{}'; upload a PDF, DOC, DOCX or RTF file",
            file.file_name(),
            file.mime_type()
        ));
    }
    if file.size_bytes() > rules.max_file_bytes {
        violations.push(format!(
            "File '{}' exceeds the maximum size of {}",
            file.file_name(),
            format_size(rules.max_file_bytes)
        ));
    }
    violations
}

fn format_size(bytes: u64) -> String {
    if bytes % BYTES_PER_MIB == 0 {
        format!("{} MiB", bytes / BYTES_PER_MIB)
    } else {
        format!("{bytes} bytes")
    }
}

// ---------------------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------------------

/// One violation per unconfirmed checklist item, in display order.
pub fn validate_checklist(checklist: &Checklist) -> Vec<String> {
    checklist
        .missing()
        .map(|item| format!("Please confirm: {}", item.label()))
        .collect()
}
