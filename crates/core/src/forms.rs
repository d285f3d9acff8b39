//! Step-scoped editors over the draft.
//!
//! A form is only handed out by [`StepSequencer`](crate::wizard::StepSequencer)
//! while its step is active, and it is the only way to change the draft.
//! Each form borrows the draft mutably, so edits cannot overlap with a
//! transition or with another form.

use uuid::Uuid;

use crate::attachments::{FileRef, UploadedFile};
use crate::authors::{Author, AuthorId, AuthorInput};
use crate::config::SubmissionRules;
use crate::draft::{Checklist, ChecklistItem, Language, SubmissionDraft};
use crate::error::CoreError;
use crate::validation::{DraftField, ValidationOutcome};

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// Checklist attestations, copyright agreement and comments to the editor.
#[derive(Debug)]
pub struct StartForm<'a> {
    draft: &'a mut SubmissionDraft,
}

impl<'a> StartForm<'a> {
    pub(crate) fn new(draft: &'a mut SubmissionDraft) -> Self {
        Self { draft }
    }

    pub fn set_checklist_item(&mut self, item: ChecklistItem, confirmed: bool) {
        self.draft.checklist.set(item, confirmed);
    }

    pub fn set_copyright_agreed(&mut self, agreed: bool) {
        self.draft.copyright_agreed = agreed;
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.draft.comments = comments.into();
    }

    pub fn checklist(&self) -> &Checklist {
        &self.draft.checklist
    }

    pub fn copyright_agreed(&self) -> bool {
        self.draft.copyright_agreed
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// The primary manuscript file.
#[derive(Debug)]
pub struct UploadForm<'a> {
    draft: &'a mut SubmissionDraft,
    rules: &'a SubmissionRules,
}

impl<'a> UploadForm<'a> {
    pub(crate) fn new(draft: &'a mut SubmissionDraft, rules: &'a SubmissionRules) -> Self {
        Self { draft, rules }
    }

    /// Validate `file` and make it the primary manuscript.
    ///
    /// A rejected file leaves the previous primary file in place and the
    /// violations are reported under [`DraftField::PrimaryFile`].
    pub fn attach_primary(&mut self, file: UploadedFile) -> Result<FileRef, ValidationOutcome> {
        match self.draft.attachments.attach_primary(file, self.rules) {
            Ok(file_ref) => Ok(file_ref.clone()),
            Err(violations) => {
                let mut outcome = ValidationOutcome::new();
                outcome.record(DraftField::PrimaryFile, violations);
                Err(outcome)
            }
        }
    }

    pub fn primary(&self) -> Option<&FileRef> {
        self.draft.attachments.primary()
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Authors, title, abstract and indexing fields.
#[derive(Debug)]
pub struct MetadataForm<'a> {
    draft: &'a mut SubmissionDraft,
}

impl<'a> MetadataForm<'a> {
    pub(crate) fn new(draft: &'a mut SubmissionDraft) -> Self {
        Self { draft }
    }

    // -- authors --

    /// Add an author. The first author added becomes principal contact.
    pub fn add_author(&mut self, input: AuthorInput) -> AuthorId {
        self.draft.authors.add(input)
    }

    pub fn update_author(&mut self, id: AuthorId, input: AuthorInput) -> Result<(), CoreError> {
        self.draft.authors.update(id, input)
    }

    /// Remove an author. The last remaining author cannot be removed.
    pub fn delete_author(&mut self, id: AuthorId) -> bool {
        self.draft.authors.remove(id)
    }

    pub fn set_principal(&mut self, id: AuthorId) -> Result<(), CoreError> {
        self.draft.authors.set_principal(id)
    }

    pub fn authors(&self) -> &[Author] {
        self.draft.authors.as_slice()
    }

    // -- text fields --

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_abstract(&mut self, abstract_text: impl Into<String>) {
        self.draft.abstract_text = abstract_text.into();
    }

    /// `;`-separated keywords.
    pub fn set_keywords(&mut self, keywords: impl Into<String>) {
        self.draft.keywords = keywords.into();
    }

    pub fn set_language(&mut self, language: Language) {
        self.draft.language = language;
    }

    /// `;`-separated supporting agencies.
    pub fn set_agencies(&mut self, agencies: impl Into<String>) {
        self.draft.agencies = agencies.into();
    }

    /// One reference per blank-line-separated block.
    pub fn set_references(&mut self, references: impl Into<String>) {
        self.draft.references = references.into();
    }

    pub fn title(&self) -> &str {
        &self.draft.title
    }
}

// ---------------------------------------------------------------------------
// Supplementary
// ---------------------------------------------------------------------------

/// Optional supplementary files. Nothing here is validated.
#[derive(Debug)]
pub struct SupplementaryForm<'a> {
    draft: &'a mut SubmissionDraft,
}

impl<'a> SupplementaryForm<'a> {
    pub(crate) fn new(draft: &'a mut SubmissionDraft) -> Self {
        Self { draft }
    }

    pub fn attach_supplementary(&mut self, file: UploadedFile) -> FileRef {
        self.draft.attachments.attach_supplementary(file).clone()
    }

    pub fn remove_supplementary(&mut self, id: Uuid) -> bool {
        self.draft.attachments.remove_supplementary(id)
    }

    pub fn files(&self) -> &[FileRef] {
        self.draft.attachments.supplementary()
    }
}
