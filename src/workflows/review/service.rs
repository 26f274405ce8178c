//! The review workflow itself: every state change funnels through here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::identity::gate::AuthContext;
use crate::identity::policy::{self, Operation};

use super::domain::{
    can_transition, ApplicationId, ApplicationRecord, PostingId, ReviewStatus, SubmissionDetails,
};
use super::repository::{
    ApplicationRepository, NewApplication, NotificationError, NotificationPublisher, PostingBoard,
    RepositoryError, StatusNotification,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WorkflowError {
    #[error("application not found")]
    NotFound,
    #[error("posting not found")]
    PostingNotFound,
    #[error("unknown application status: {0}")]
    InvalidStatus(String),
    /// The current status does not allow the requested change. `to` is
    /// `None` for withdrawals, which have no target status.
    #[error("application status {from} does not allow the requested change")]
    InvalidTransition {
        from: ReviewStatus,
        to: Option<ReviewStatus>,
    },
    #[error("posting is not open for applications")]
    PostingNotOpen,
    #[error("an application for this posting already exists")]
    AlreadyApplied,
    #[error("operation not permitted for this role")]
    Forbidden,
    #[error("application was modified concurrently; retry")]
    Conflict,
    #[error(transparent)]
    Repository(RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl From<RepositoryError> for WorkflowError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => WorkflowError::Conflict,
            RepositoryError::NotFound => WorkflowError::NotFound,
            RepositoryError::Duplicate => WorkflowError::AlreadyApplied,
            other => WorkflowError::Repository(other),
        }
    }
}

/// Orchestrates application intake and review over swappable stores.
pub struct ReviewWorkflow<R, P, N> {
    repository: Arc<R>,
    postings: Arc<P>,
    notifier: Arc<N>,
}

impl<R, P, N> ReviewWorkflow<R, P, N>
where
    R: ApplicationRepository,
    P: PostingBoard,
    N: NotificationPublisher,
{
    pub fn new(repository: Arc<R>, postings: Arc<P>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            postings,
            notifier,
        }
    }

    /// Submit an application against an open posting. New records start
    /// `Pending`; the (student, posting) pair is claimed in the store with
    /// a single winner.
    pub fn apply(
        &self,
        actor: &AuthContext,
        posting: PostingId,
        submission: SubmissionDetails,
    ) -> Result<ApplicationRecord, WorkflowError> {
        if !policy::allows(actor.role, Operation::ApplyForPosting) {
            return Err(WorkflowError::Forbidden);
        }

        let listing = self
            .postings
            .fetch(posting)
            .ok_or(WorkflowError::PostingNotFound)?;
        if !listing.status.is_open() {
            return Err(WorkflowError::PostingNotOpen);
        }

        let record = self.repository.create(NewApplication {
            student: actor.principal_id,
            posting,
            submission,
        })?;

        info!(application = %record.id, student = %record.student, posting = %posting, "application submitted");
        self.notifier.publish(StatusNotification {
            student: record.student,
            application: record.id,
            status: record.status,
            headline: format!("Application received for \"{}\"", listing.title),
        })?;

        Ok(record)
    }

    /// Withdraw an own application. Only `Pending` records can be pulled
    /// back; anything already picked up by a reviewer stays.
    pub fn withdraw(
        &self,
        actor: &AuthContext,
        id: ApplicationId,
    ) -> Result<(), WorkflowError> {
        if !policy::allows(actor.role, Operation::WithdrawApplication) {
            return Err(WorkflowError::Forbidden);
        }

        let record = self.repository.fetch(id)?;
        if record.student != actor.principal_id {
            return Err(WorkflowError::Forbidden);
        }
        if record.status != ReviewStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: record.status,
                to: None,
            });
        }

        self.repository.delete(id)?;
        info!(application = %id, student = %actor.principal_id, "application withdrawn");
        Ok(())
    }

    /// Fetch one record. Reviewers see everything; students only their own.
    pub fn get(
        &self,
        actor: &AuthContext,
        id: ApplicationId,
    ) -> Result<ApplicationRecord, WorkflowError> {
        let record = self.repository.fetch(id)?;
        if policy::allows(actor.role, Operation::ViewApplications)
            || record.student == actor.principal_id
        {
            Ok(record)
        } else {
            Err(WorkflowError::Forbidden)
        }
    }

    /// Move a record to a new status, stamping the reviewer audit fields and
    /// notifying the owning student. Terminal records are hard-blocked.
    pub fn transition(
        &self,
        actor: &AuthContext,
        id: ApplicationId,
        to: ReviewStatus,
        notes: Option<String>,
    ) -> Result<ApplicationRecord, WorkflowError> {
        if !policy::allows(actor.role, Operation::DriveTransition) {
            return Err(WorkflowError::Forbidden);
        }

        let mut record = self.repository.fetch(id)?;
        if !can_transition(record.status, to) {
            return Err(WorkflowError::InvalidTransition {
                from: record.status,
                to: Some(to),
            });
        }

        let from = record.status;
        record.status = to;
        record.reviewer = Some(actor.principal_id);
        record.reviewed_at = Some(Utc::now());
        if notes.is_some() {
            record.review_notes = notes;
        }

        let updated = self.repository.update(&record)?;
        info!(application = %id, %from, %to, reviewer = %actor.principal_id, "application status changed");

        self.notifier.publish(StatusNotification {
            student: updated.student,
            application: updated.id,
            status: updated.status,
            headline: format!("Application status updated to {}", to.label()),
        })?;

        Ok(updated)
    }

    /// Notes-only audit update: stamps the reviewer but does not move state
    /// and does not notify.
    pub fn update_notes(
        &self,
        actor: &AuthContext,
        id: ApplicationId,
        notes: String,
    ) -> Result<ApplicationRecord, WorkflowError> {
        if !policy::allows(actor.role, Operation::DriveTransition) {
            return Err(WorkflowError::Forbidden);
        }

        let mut record = self.repository.fetch(id)?;
        record.review_notes = Some(notes);
        record.reviewer = Some(actor.principal_id);
        record.reviewed_at = Some(Utc::now());

        Ok(self.repository.update(&record)?)
    }

    /// Best-effort batch transition: per-item failures are logged and
    /// skipped, never aborting the loop. Returns the number of records
    /// actually updated.
    pub fn bulk_transition(
        &self,
        actor: &AuthContext,
        ids: &[ApplicationId],
        to: ReviewStatus,
        notes: Option<String>,
    ) -> Result<usize, WorkflowError> {
        if !policy::allows(actor.role, Operation::DriveTransition) {
            return Err(WorkflowError::Forbidden);
        }

        let mut updated = 0;
        for id in ids {
            match self.transition(actor, *id, to, notes.clone()) {
                Ok(_) => updated += 1,
                Err(err) => {
                    warn!(application = %id, %err, "bulk status update skipped item");
                }
            }
        }

        info!(requested = ids.len(), updated, %to, "bulk status update finished");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Kind, PrincipalId, Role};
    use crate::workflows::review::domain::{Posting, PostingStatus};
    use crate::workflows::review::store::{InMemoryApplicationStore, InMemoryPostingBoard};
    use std::sync::Mutex;

    /// Capture sink standing in for the mail gateway.
    #[derive(Default)]
    struct RecordedNotifications {
        sent: Mutex<Vec<StatusNotification>>,
        fail_next: Mutex<bool>,
    }

    impl RecordedNotifications {
        fn sent(&self) -> Vec<StatusNotification> {
            self.sent.lock().expect("notification lock").clone()
        }

        fn fail_next(&self) {
            *self.fail_next.lock().expect("notification lock") = true;
        }
    }

    impl NotificationPublisher for RecordedNotifications {
        fn publish(&self, notification: StatusNotification) -> Result<(), NotificationError> {
            let mut fail = self.fail_next.lock().expect("notification lock");
            if *fail {
                *fail = false;
                return Err(NotificationError("gateway offline".to_string()));
            }
            self.sent
                .lock()
                .expect("notification lock")
                .push(notification);
            Ok(())
        }
    }

    struct Fixture {
        workflow: ReviewWorkflow<InMemoryApplicationStore, InMemoryPostingBoard, RecordedNotifications>,
        postings: Arc<InMemoryPostingBoard>,
        notifier: Arc<RecordedNotifications>,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryApplicationStore::new());
        let postings = Arc::new(InMemoryPostingBoard::new());
        let notifier = Arc::new(RecordedNotifications::default());
        postings.publish(Posting {
            id: PostingId(10),
            title: "Backend Intern".to_string(),
            status: PostingStatus::Posted,
        });
        Fixture {
            workflow: ReviewWorkflow::new(repository, postings.clone(), notifier.clone()),
            postings,
            notifier,
        }
    }

    fn student(id: u64) -> AuthContext {
        AuthContext {
            principal_id: PrincipalId(id),
            kind: Kind::Student,
            role: Role::Student,
        }
    }

    fn reviewer(id: u64) -> AuthContext {
        AuthContext {
            principal_id: PrincipalId(id),
            kind: Kind::Staff,
            role: Role::Hr,
        }
    }

    #[test]
    fn apply_creates_pending_record_and_notifies() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        assert_eq!(record.status, ReviewStatus::Pending);
        assert_eq!(record.student, PrincipalId(1));
        let sent = fixture.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].headline.contains("Backend Intern"));
    }

    #[test]
    fn apply_requires_open_posting() {
        let fixture = fixture();
        fixture.postings.publish(Posting {
            id: PostingId(11),
            title: "Draft Role".to_string(),
            status: PostingStatus::Draft,
        });

        assert_eq!(
            fixture
                .workflow
                .apply(&student(1), PostingId(11), SubmissionDetails::default()),
            Err(WorkflowError::PostingNotOpen)
        );
        assert_eq!(
            fixture
                .workflow
                .apply(&student(1), PostingId(99), SubmissionDetails::default()),
            Err(WorkflowError::PostingNotFound)
        );
    }

    #[test]
    fn second_apply_for_same_posting_is_rejected() {
        let fixture = fixture();
        fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("first apply wins");

        assert_eq!(
            fixture
                .workflow
                .apply(&student(1), PostingId(10), SubmissionDetails::default()),
            Err(WorkflowError::AlreadyApplied)
        );
    }

    #[test]
    fn reviewers_cannot_apply_students_cannot_review() {
        let fixture = fixture();
        assert_eq!(
            fixture
                .workflow
                .apply(&reviewer(5), PostingId(10), SubmissionDetails::default()),
            Err(WorkflowError::Forbidden)
        );

        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");
        assert_eq!(
            fixture
                .workflow
                .transition(&student(1), record.id, ReviewStatus::Accepted, None),
            Err(WorkflowError::Forbidden)
        );
    }

    #[test]
    fn transition_stamps_reviewer_audit_fields() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        let updated = fixture
            .workflow
            .transition(
                &reviewer(5),
                record.id,
                ReviewStatus::UnderReview,
                Some("strong resume".to_string()),
            )
            .expect("transition succeeds");

        assert_eq!(updated.status, ReviewStatus::UnderReview);
        assert_eq!(updated.reviewer, Some(PrincipalId(5)));
        assert!(updated.reviewed_at.is_some());
        assert_eq!(updated.review_notes.as_deref(), Some("strong resume"));
        assert_eq!(updated.version, record.version + 1);

        let sent = fixture.notifier.sent();
        assert_eq!(sent.last().map(|n| n.status), Some(ReviewStatus::UnderReview));
    }

    #[test]
    fn transition_without_notes_keeps_existing_notes() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        let noted = fixture
            .workflow
            .update_notes(&reviewer(5), record.id, "call scheduled".to_string())
            .expect("notes updated");
        assert_eq!(noted.status, ReviewStatus::Pending, "notes do not move state");

        let updated = fixture
            .workflow
            .transition(&reviewer(5), record.id, ReviewStatus::Shortlisted, None)
            .expect("transition succeeds");
        assert_eq!(updated.review_notes.as_deref(), Some("call scheduled"));
    }

    #[test]
    fn terminal_records_are_hard_blocked() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");
        fixture
            .workflow
            .transition(&reviewer(5), record.id, ReviewStatus::Rejected, None)
            .expect("rejection succeeds");

        assert_eq!(
            fixture
                .workflow
                .transition(&reviewer(5), record.id, ReviewStatus::Accepted, None),
            Err(WorkflowError::InvalidTransition {
                from: ReviewStatus::Rejected,
                to: Some(ReviewStatus::Accepted),
            })
        );
    }

    #[test]
    fn withdraw_only_own_pending_applications() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        assert_eq!(
            fixture.workflow.withdraw(&student(2), record.id),
            Err(WorkflowError::Forbidden),
            "another student may not withdraw it"
        );

        fixture
            .workflow
            .transition(&reviewer(5), record.id, ReviewStatus::Shortlisted, None)
            .expect("transition succeeds");

        assert_eq!(
            fixture.workflow.withdraw(&student(1), record.id),
            Err(WorkflowError::InvalidTransition {
                from: ReviewStatus::Shortlisted,
                to: None,
            })
        );
        // Record untouched by the failed withdraw.
        let still_there = fixture
            .workflow
            .get(&student(1), record.id)
            .expect("record still present");
        assert_eq!(still_there.status, ReviewStatus::Shortlisted);
    }

    #[test]
    fn withdraw_deletes_pending_record() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        fixture
            .workflow
            .withdraw(&student(1), record.id)
            .expect("withdraw succeeds");
        assert_eq!(
            fixture.workflow.get(&student(1), record.id),
            Err(WorkflowError::NotFound)
        );
    }

    #[test]
    fn students_only_see_their_own_records() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        assert!(fixture.workflow.get(&student(1), record.id).is_ok());
        assert!(fixture.workflow.get(&reviewer(5), record.id).is_ok());
        assert_eq!(
            fixture.workflow.get(&student(2), record.id),
            Err(WorkflowError::Forbidden)
        );
    }

    #[test]
    fn bulk_transition_skips_failures_and_counts_the_rest() {
        let fixture = fixture();
        let first = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");
        let second = fixture
            .workflow
            .apply(&student(2), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        let updated = fixture
            .workflow
            .bulk_transition(
                &reviewer(5),
                &[first.id, ApplicationId(999), second.id],
                ReviewStatus::UnderReview,
                None,
            )
            .expect("bulk runs to completion");

        assert_eq!(updated, 2);
        for id in [first.id, second.id] {
            let record = fixture.workflow.get(&reviewer(5), id).expect("present");
            assert_eq!(record.status, ReviewStatus::UnderReview);
        }
    }

    #[test]
    fn bulk_transition_is_forbidden_for_students() {
        let fixture = fixture();
        assert_eq!(
            fixture.workflow.bulk_transition(
                &student(1),
                &[ApplicationId(1)],
                ReviewStatus::UnderReview,
                None
            ),
            Err(WorkflowError::Forbidden)
        );
    }

    #[test]
    fn bulk_does_not_count_items_whose_notification_failed() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        fixture.notifier.fail_next();
        let updated = fixture
            .workflow
            .bulk_transition(&reviewer(5), &[record.id], ReviewStatus::UnderReview, None)
            .expect("bulk runs to completion");
        assert_eq!(updated, 0);
    }

    #[test]
    fn concurrent_transitions_have_one_winner() {
        let fixture = fixture();
        let record = fixture
            .workflow
            .apply(&student(1), PostingId(10), SubmissionDetails::default())
            .expect("apply succeeds");

        let workflow = Arc::new(fixture.workflow);
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let handles: Vec<_> = [ReviewStatus::UnderReview, ReviewStatus::Shortlisted]
            .into_iter()
            .enumerate()
            .map(|(i, to)| {
                let workflow = workflow.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    workflow.transition(&reviewer(5 + i as u64), record.id, to, None)
                })
            })
            .collect();

        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect();

        let winners = outcomes.iter().filter(|r| r.is_ok()).count();
        // Both may succeed if they serialize cleanly; the invariant is that
        // a loser surfaces as Conflict, never a silent overwrite.
        assert!(winners >= 1);
        assert!(outcomes
            .iter()
            .all(|r| r.is_ok() || matches!(r, Err(WorkflowError::Conflict))));
    }
}
