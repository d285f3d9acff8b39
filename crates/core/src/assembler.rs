//! Projects a finished draft into an immutable [`Submission`].
//!
//! Assembly is a structural transform: list fields are split and trimmed,
//! authors and file references are copied as-is, and an identifier plus
//! timestamp are stamped on. No bytes are read and the draft is not touched.

use serde::Serialize;
use uuid::Uuid;

use crate::attachments::FileRef;
use crate::authors::Author;
use crate::client::Submitter;
use crate::draft::{ChecklistItem, Language, SubmissionDraft};
use crate::types::Timestamp;

/// Separator for keyword and agency lists.
pub const LIST_SEPARATOR: char = ';';

/// Invariant violations detected while projecting a draft.
///
/// The step gates should make these unreachable; hitting one is a defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("draft has no authors")]
    NoAuthors,

    #[error("draft must have exactly one principal contact, found {count}")]
    PrincipalContact { count: usize },

    #[error("draft has no primary manuscript file")]
    MissingPrimaryFile,

    #[error("draft checklist is incomplete: {missing} item(s) unconfirmed")]
    ChecklistIncomplete { missing: usize },

    #[error("copyright notice was not agreed to")]
    CopyrightNotAgreed,
}

/// A finalized manuscript submission, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    id: Uuid,
    created_at: Timestamp,
    submitted_by: Submitter,
    checklist: Vec<ChecklistItem>,
    copyright_agreed: bool,
    comments: String,
    authors: Vec<Author>,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    keywords: Vec<String>,
    language: Language,
    agencies: Vec<String>,
    references: Vec<String>,
    primary_file: FileRef,
    supplementary_files: Vec<FileRef>,
}

impl Submission {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn submitted_by(&self) -> &Submitter {
        &self.submitted_by
    }

    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    pub fn copyright_agreed(&self) -> bool {
        self.copyright_agreed
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn principal_author(&self) -> Option<&Author> {
        self.authors.iter().find(|a| a.is_principal)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn agencies(&self) -> &[String] {
        &self.agencies
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn primary_file(&self) -> &FileRef {
        &self.primary_file
    }

    pub fn supplementary_files(&self) -> &[FileRef] {
        &self.supplementary_files
    }
}

/// Assemble `draft` into a [`Submission`] attributed to `submitter`.
///
/// Either every invariant holds and a complete submission is returned, or
/// nothing is produced.
pub fn assemble(
    draft: &SubmissionDraft,
    submitter: &Submitter,
) -> Result<Submission, AssemblyError> {
    check_invariants(draft)?;

    let primary_file = draft
        .attachments
        .primary()
        .cloned()
        .ok_or(AssemblyError::MissingPrimaryFile)?;

    Ok(Submission {
        id: Uuid::now_v7(),
        created_at: chrono::Utc::now(),
        submitted_by: submitter.clone(),
        checklist: draft.checklist.confirmed(),
        copyright_agreed: draft.copyright_agreed,
        comments: draft.comments.trim().to_string(),
        authors: draft.authors.as_slice().to_vec(),
        title: draft.title.trim().to_string(),
        abstract_text: draft.abstract_text.trim().to_string(),
        keywords: split_list(&draft.keywords),
        language: draft.language,
        agencies: split_list(&draft.agencies),
        references: split_references(&draft.references),
        primary_file,
        supplementary_files: draft.attachments.supplementary().to_vec(),
    })
}

fn check_invariants(draft: &SubmissionDraft) -> Result<(), AssemblyError> {
    if draft.authors.is_empty() {
        return Err(AssemblyError::NoAuthors);
    }
    let count = draft.authors.iter().filter(|a| a.is_principal).count();
    if count != 1 {
        return Err(AssemblyError::PrincipalContact { count });
    }
    let missing = draft.checklist.missing().count();
    if missing > 0 {
        return Err(AssemblyError::ChecklistIncomplete { missing });
    }
    if !draft.copyright_agreed {
        return Err(AssemblyError::CopyrightNotAgreed);
    }
    Ok(())
}

/// Split a `;`-separated list, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split reference text into entries separated by one or more blank lines.
///
/// Lines inside an entry are kept, joined with `\n`; each entry is trimmed.
pub fn split_references(input: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            flush_entry(&mut current, &mut entries);
        } else {
            current.push(line.trim_end());
        }
    }
    flush_entry(&mut current, &mut entries);

    entries
}

fn flush_entry(current: &mut Vec<&str>, entries: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let entry = current.join("\n").trim().to_string();
    current.clear();
    if !entry.is_empty() {
        entries.push(entry);
    }
}
