//! Boundary contracts with the collaborators the engine does not own.
//!
//! The persistence side is reached through [`SubmissionClient`]; the acting
//! user is supplied by the caller as a [`Submitter`].

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::assembler::Submission;
use crate::types::DbId;

/// The authenticated user a submission is attributed to.
///
/// The engine does not authenticate; it trusts whatever the auth layer hands in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submitter {
    pub user_id: DbId,
    pub email: String,
}

impl Submitter {
    pub fn new(user_id: DbId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

/// Identifier assigned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PersistedId(String);

impl PersistedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure reported by a [`SubmissionClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The server found problems the local gates did not catch.
    /// Keys are the server's field names.
    #[error("Submission rejected: {} field error(s)", .field_errors.len())]
    ValidationRejected { field_errors: BTreeMap<String, String> },

    /// Retryable failure (network, timeout, overload).
    #[error("Transient failure: {0}")]
    TransientFailure(String),

    /// Non-retryable failure.
    #[error("Fatal failure: {0}")]
    Fatal(String),
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }
}

/// Persists an assembled [`Submission`].
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, submission: Submission) -> Result<PersistedId, SubmitError>;
}
