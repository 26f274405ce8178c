//! Review-state domain model: record shape, status machine, id newtypes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::PrincipalId;

/// Identifier for a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an internship posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingId(pub u64);

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five review pipeline states. `Accepted` and `Rejected` are terminal;
/// `Pending` is the entry state and never a transition target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    Pending,
    UnderReview,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ReviewStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::UnderReview => "Under Review",
            ReviewStatus::Shortlisted => "Shortlisted",
            ReviewStatus::Accepted => "Accepted",
            ReviewStatus::Rejected => "Rejected",
        }
    }

    /// Case-insensitive parse over both label ("Under Review") and
    /// identifier ("under_review") spellings. Unknown input is `None`,
    /// never a silent default.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "pending" => Some(ReviewStatus::Pending),
            "underreview" => Some(ReviewStatus::UnderReview),
            "shortlisted" => Some(ReviewStatus::Shortlisted),
            "accepted" => Some(ReviewStatus::Accepted),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReviewStatus::Accepted | ReviewStatus::Rejected)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a reviewer-driven move from `from` to `to` is allowed. Terminal
/// records are hard-blocked with no override; reopening to `Pending` is not
/// a reviewer action.
pub fn can_transition(from: ReviewStatus, to: ReviewStatus) -> bool {
    !from.is_terminal() && to != ReviewStatus::Pending
}

/// Lifecycle of a posting as the workflow sees it. Only `Posted` accepts
/// applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    Draft,
    Posted,
    Closed,
}

impl PostingStatus {
    pub fn is_open(self) -> bool {
        matches!(self, PostingStatus::Posted)
    }
}

/// Snapshot of a posting; listing management lives outside this workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PostingId,
    pub title: String,
    pub status: PostingStatus,
}

/// Applicant-provided payload, opaque to the state machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetails {
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub additional_skills: Option<String>,
    pub availability: Option<String>,
}

/// One student's application against one posting.
///
/// `student` and `posting` are immutable after creation; the pair is unique
/// store-wide. `version` backs optimistic concurrency: every successful
/// write bumps it, and a stale writer gets a conflict instead of silently
/// overwriting.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub student: PrincipalId,
    pub posting: PostingId,
    pub status: ReviewStatus,
    pub submission: SubmissionDetails,
    pub reviewer: Option<PrincipalId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl ApplicationRecord {
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id,
            student: self.student,
            posting: self.posting,
            status: self.status.label().to_string(),
            submission: self.submission.clone(),
            reviewer: self.reviewer,
            reviewed_at: self.reviewed_at,
            review_notes: self.review_notes.clone(),
            applied_at: self.applied_at,
            updated_at: self.updated_at,
        }
    }
}

/// API-facing projection of an application record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub student: PrincipalId,
    pub posting: PostingId,
    pub status: String,
    pub submission: SubmissionDetails,
    pub reviewer: Option<PrincipalId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
