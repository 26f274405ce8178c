//! Store and side-channel seams for the review workflow.

use crate::identity::PrincipalId;

use super::domain::{
    ApplicationId, ApplicationRecord, Posting, PostingId, ReviewStatus, SubmissionDetails,
};

/// Fields for a new application. Records always start `Pending`.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub student: PrincipalId,
    pub posting: PostingId,
    pub submission: SubmissionDetails,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The record changed since the caller read it.
    #[error("record was modified concurrently")]
    Conflict,
    /// A record for the same (student, posting) pair already exists.
    #[error("record already exists")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for application records.
///
/// Implementations must enforce (student, posting) uniqueness at create time
/// with a single winner, and reject `update` when the caller's `version` is
/// stale.
pub trait ApplicationRepository: Send + Sync {
    fn create(&self, application: NewApplication) -> Result<ApplicationRecord, RepositoryError>;

    fn fetch(&self, id: ApplicationId) -> Result<ApplicationRecord, RepositoryError>;

    /// Version-checked write. The stored version must equal the caller's;
    /// the store bumps it and stamps `updated_at`.
    fn update(&self, record: &ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError>;
}

/// Read-only view onto published postings.
pub trait PostingBoard: Send + Sync {
    fn fetch(&self, id: PostingId) -> Option<Posting>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("notification channel unavailable: {0}")]
pub struct NotificationError(pub String);

/// Outbound message to the owning student when their application moves.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusNotification {
    pub student: PrincipalId,
    pub application: ApplicationId,
    pub status: ReviewStatus,
    pub headline: String,
}

/// Delivery seam; the workflow stops at `publish`.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: StatusNotification) -> Result<(), NotificationError>;
}
