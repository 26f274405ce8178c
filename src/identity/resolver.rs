//! Single translation point from the three raw stores to the [`Principal`]
//! sum type.
//!
//! Probe order is Admin, Student, Staff — a fixed design choice, not a
//! security property, since the stores hold disjoint email sets.

use std::sync::Arc;

use tracing::debug;

use super::directory::PrincipalDirectory;
use super::principal::{Kind, Principal, PrincipalId};
use super::IdentityError;

/// Lower-cased, trimmed form used for every probe and every write.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

pub struct IdentityResolver<D> {
    directory: Arc<D>,
}

impl<D> Clone for IdentityResolver<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: PrincipalDirectory> IdentityResolver<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    /// Resolve an email against all three stores, first hit wins.
    pub fn resolve(&self, email: &str) -> Option<(Principal, Kind)> {
        let email = normalize_email(email);

        if let Some(admin) = self.directory.find_admin_by_email(&email) {
            debug!(%email, "principal resolved in admin store");
            return Some((Principal::Admin(admin), Kind::Admin));
        }
        if let Some(student) = self.directory.find_student_by_email(&email) {
            debug!(%email, "principal resolved in student store");
            return Some((Principal::Student(student), Kind::Student));
        }
        if let Some(staff) = self.directory.find_staff_by_email(&email) {
            debug!(%email, "principal resolved in staff store");
            return Some((Principal::Staff(staff), Kind::Staff));
        }

        None
    }

    /// Lookup by id filtered by the kind the caller claims; used by the
    /// authentication gate to re-check token subjects.
    pub fn resolve_id(&self, kind: Kind, id: PrincipalId) -> Option<Principal> {
        self.directory.find_by_id(kind, id)
    }

    /// Pre-flight uniqueness check. The store re-enforces this atomically at
    /// insert time, so callers treat this as advisory only.
    pub fn assert_email_available(&self, email: &str) -> Result<(), IdentityError> {
        if self.directory.email_in_use(&normalize_email(email)) {
            return Err(IdentityError::DuplicateIdentity);
        }
        Ok(())
    }
}
