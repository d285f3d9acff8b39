//! Primary and supplementary file attachments.
//!
//! The registry never touches file bytes. The storage collaborator hands over
//! an [`UploadedFile`] describing bytes it already holds, and the registry
//! turns accepted uploads into [`FileRef`]s.

use serde::Serialize;
use uuid::Uuid;

use crate::config::SubmissionRules;
use crate::types::Timestamp;
use crate::validation::validate_file;

/// Opaque reference to bytes held by the file storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageHandle(String);

impl StorageHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Metadata the file validator inspects.
pub trait FileDescriptor {
    fn file_name(&self) -> &str;
    fn mime_type(&self) -> &str;
    fn size_bytes(&self) -> u64;
}

/// A file as reported by storage, before the registry has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub handle: StorageHandle,
}

impl FileDescriptor for UploadedFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// An accepted attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub id: Uuid,
    pub original_file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_at: Timestamp,
    pub handle: StorageHandle,
}

impl FileRef {
    fn accept(file: UploadedFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_file_name: file.file_name,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            uploaded_at: chrono::Utc::now(),
            handle: file.handle,
        }
    }
}

impl FileDescriptor for FileRef {
    fn file_name(&self) -> &str {
        &self.original_file_name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Holds at most one primary file and any number of supplementary files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentRegistry {
    primary: Option<FileRef>,
    supplementary: Vec<FileRef>,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and install `file` as the primary manuscript, replacing any
    /// previous one. On rejection the registry is unchanged and the
    /// violations are returned.
    pub fn attach_primary(
        &mut self,
        file: UploadedFile,
        rules: &SubmissionRules,
    ) -> Result<&FileRef, Vec<String>> {
        let violations = validate_file(Some(&file), rules);
        if !violations.is_empty() {
            tracing::debug!(
                file_name = %file.file_name,
                violations = violations.len(),
                "Primary attachment rejected"
            );
            return Err(violations);
        }
        if let Some(previous) = &self.primary {
            tracing::debug!(replaced = %previous.id, "Replacing primary attachment");
        }
        Ok(self.primary.insert(FileRef::accept(file)))
    }

    /// Append a supplementary file. No format or size checks apply.
    pub fn attach_supplementary(&mut self, file: UploadedFile) -> &FileRef {
        self.supplementary.push(FileRef::accept(file));
        // Just pushed, so the list is non-empty.
        &self.supplementary[self.supplementary.len() - 1]
    }

    /// Remove a supplementary file. Returns `false` if `id` is unknown.
    pub fn remove_supplementary(&mut self, id: Uuid) -> bool {
        let before = self.supplementary.len();
        self.supplementary.retain(|f| f.id != id);
        self.supplementary.len() != before
    }

    pub fn primary(&self) -> Option<&FileRef> {
        self.primary.as_ref()
    }

    pub fn supplementary(&self) -> &[FileRef] {
        &self.supplementary
    }
}
