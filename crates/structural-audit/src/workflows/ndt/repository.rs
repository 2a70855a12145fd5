use serde::{Deserialize, Serialize};

use super::domain::AuditId;
use super::submission::{FormField, SubmissionPayload, SubmissionReceipt, SubmissionStatus};

/// A stored NDT submission as persistence hands it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSubmission {
    pub audit_id: AuditId,
    pub status: SubmissionStatus,
    pub fields: Vec<FormField>,
}

/// Persistence collaborator for NDT submissions. It owns atomicity; callers never write partially.
pub trait SubmissionRepository: Send + Sync {
    fn submission_status(&self, audit_id: &AuditId) -> Result<SubmissionStatus, RepositoryError>;
    fn persist(&self, payload: SubmissionPayload) -> Result<SubmissionReceipt, RepositoryError>;
    fn fetch(&self, audit_id: &AuditId) -> Result<Option<PersistedSubmission>, RepositoryError>;
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("submission already stored")]
    Conflict,
    #[error("persistence rejected the submission with status {status}")]
    Rejected { status: u16 },
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}
