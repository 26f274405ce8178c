//! In-memory store implementations.
//!
//! These stand in for the relational store the platform deploys with; the
//! single-winner uniqueness and version-check semantics are the contract any
//! real backend must keep.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use super::domain::{ApplicationId, ApplicationRecord, Posting, PostingId, ReviewStatus};
use super::repository::{
    ApplicationRepository, NewApplication, NotificationError, NotificationPublisher, PostingBoard,
    RepositoryError, StatusNotification,
};

#[derive(Default)]
struct StoreState {
    records: HashMap<u64, ApplicationRecord>,
    // Claimed (student, posting) pairs; held under the same lock as the
    // records map so concurrent duplicate applies produce one winner.
    pair_index: HashSet<(u64, u64)>,
    next_id: u64,
}

/// Mutex-guarded application store with optimistic version checks.
#[derive(Default)]
pub struct InMemoryApplicationStore {
    inner: Mutex<StoreState>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApplicationRepository for InMemoryApplicationStore {
    fn create(&self, application: NewApplication) -> Result<ApplicationRecord, RepositoryError> {
        let mut state = self.inner.lock().expect("application store lock");

        let pair = (application.student.0, application.posting.0);
        if !state.pair_index.insert(pair) {
            return Err(RepositoryError::Duplicate);
        }

        state.next_id += 1;
        let now = Utc::now();
        let record = ApplicationRecord {
            id: ApplicationId(state.next_id),
            student: application.student,
            posting: application.posting,
            status: ReviewStatus::Pending,
            submission: application.submission,
            reviewer: None,
            reviewed_at: None,
            review_notes: None,
            applied_at: now,
            updated_at: now,
            version: 1,
        };
        state.records.insert(record.id.0, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ApplicationId) -> Result<ApplicationRecord, RepositoryError> {
        let state = self.inner.lock().expect("application store lock");
        state
            .records
            .get(&id.0)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn update(&self, record: &ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut state = self.inner.lock().expect("application store lock");
        let stored = state
            .records
            .get_mut(&record.id.0)
            .ok_or(RepositoryError::NotFound)?;

        if stored.version != record.version {
            return Err(RepositoryError::Conflict);
        }

        let mut updated = record.clone();
        // Owner and posting are immutable after creation.
        updated.student = stored.student;
        updated.posting = stored.posting;
        updated.version = stored.version + 1;
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut state = self.inner.lock().expect("application store lock");
        let record = state
            .records
            .remove(&id.0)
            .ok_or(RepositoryError::NotFound)?;
        state.pair_index.remove(&(record.student.0, record.posting.0));
        Ok(())
    }
}

/// Mutex-guarded posting board.
#[derive(Default)]
pub struct InMemoryPostingBoard {
    postings: Mutex<HashMap<u64, Posting>>,
}

impl InMemoryPostingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, posting: Posting) {
        let mut postings = self.postings.lock().expect("posting board lock");
        postings.insert(posting.id.0, posting);
    }
}

impl PostingBoard for InMemoryPostingBoard {
    fn fetch(&self, id: PostingId) -> Option<Posting> {
        let postings = self.postings.lock().expect("posting board lock");
        postings.get(&id.0).cloned()
    }
}

/// Publisher that records the outbound message in the log stream. The
/// deployed platform swaps in a mail gateway behind the same trait.
#[derive(Default)]
pub struct LoggingNotifier;

impl NotificationPublisher for LoggingNotifier {
    fn publish(&self, notification: StatusNotification) -> Result<(), NotificationError> {
        info!(
            student = %notification.student,
            application = %notification.application,
            status = %notification.status,
            "{}",
            notification.headline
        );
        Ok(())
    }
}
