//! Internship application review workflow.
//!
//! A fixed five-state review machine over application records, driven by
//! reviewers (admin, HR, faculty) and bounded by student-owned submit and
//! withdraw operations. Persistence, posting lookups, and notifications are
//! trait seams so the workflow stays testable without a live backend.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationView, Posting, PostingId, PostingStatus,
    ReviewStatus, SubmissionDetails,
};
pub use repository::{
    ApplicationRepository, NewApplication, NotificationError, NotificationPublisher, PostingBoard,
    RepositoryError, StatusNotification,
};
pub use service::{ReviewWorkflow, WorkflowError};
pub use store::{InMemoryApplicationStore, InMemoryPostingBoard, LoggingNotifier};
