//! Lookup surfaces over the three principal stores.
//!
//! The trait exposes one probe per store plus creation methods that claim the
//! email atomically across all three. Email uniqueness is a store-level
//! guarantee here, not a check-then-act sequence at the caller: the in-memory
//! implementation routes every write through a single mutex-guarded email
//! index so concurrent registrations produce exactly one winner.

use std::collections::HashMap;
use std::sync::Mutex;

use super::principal::{
    AdminRecord, Kind, Principal, PrincipalId, StaffRecord, StaffRole, StudentRecord,
};

/// Fields for a new administrator. Emails must be pre-normalized.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: Option<String>,
}

/// Fields for a new HR/faculty account.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: Option<String>,
    pub role: StaffRole,
}

/// Fields for a new student account.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: Option<String>,
    pub location: Option<String>,
    pub degree: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("email already registered")]
    DuplicateIdentity,
    #[error("principal not found")]
    NotFound,
}

/// Data access over the three disjoint identity stores.
///
/// Implementations must enforce that an email value exists in at most one
/// store at any time; `insert_*` is the claim point.
pub trait PrincipalDirectory: Send + Sync {
    fn find_admin_by_email(&self, email: &str) -> Option<AdminRecord>;
    fn find_student_by_email(&self, email: &str) -> Option<StudentRecord>;
    fn find_staff_by_email(&self, email: &str) -> Option<StaffRecord>;

    /// Lookup by id, filtered by the kind the caller claims.
    fn find_by_id(&self, kind: Kind, id: PrincipalId) -> Option<Principal>;

    fn email_in_use(&self, email: &str) -> bool;

    fn insert_admin(&self, admin: NewAdmin) -> Result<AdminRecord, DirectoryError>;
    fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, DirectoryError>;
    fn insert_staff(&self, staff: NewStaff) -> Result<StaffRecord, DirectoryError>;

    fn set_active(&self, kind: Kind, id: PrincipalId, active: bool) -> Result<(), DirectoryError>;

    /// Remove a staff account entirely, releasing its email.
    fn delete_staff(&self, id: PrincipalId) -> Result<(), DirectoryError>;
}

#[derive(Default)]
struct DirectoryState {
    // One index across all three stores; holding it while inserting is what
    // makes the uniqueness invariant race-free.
    email_index: HashMap<String, Kind>,
    admins: HashMap<u64, AdminRecord>,
    students: HashMap<u64, StudentRecord>,
    staff: HashMap<u64, StaffRecord>,
    next_id: u64,
}

impl DirectoryState {
    fn allocate_id(&mut self) -> PrincipalId {
        self.next_id += 1;
        PrincipalId(self.next_id)
    }

    fn claim_email(&mut self, email: &str, kind: Kind) -> Result<(), DirectoryError> {
        if self.email_index.contains_key(email) {
            return Err(DirectoryError::DuplicateIdentity);
        }
        self.email_index.insert(email.to_string(), kind);
        Ok(())
    }
}

/// Mutex-guarded in-memory directory. Stands in for the relational store the
/// platform deploys with; the uniqueness semantics are the contract.
#[derive(Default)]
pub struct InMemoryDirectory {
    inner: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrincipalDirectory for InMemoryDirectory {
    fn find_admin_by_email(&self, email: &str) -> Option<AdminRecord> {
        let state = self.inner.lock().expect("directory lock");
        state
            .admins
            .values()
            .find(|record| record.email == email)
            .cloned()
    }

    fn find_student_by_email(&self, email: &str) -> Option<StudentRecord> {
        let state = self.inner.lock().expect("directory lock");
        state
            .students
            .values()
            .find(|record| record.email == email)
            .cloned()
    }

    fn find_staff_by_email(&self, email: &str) -> Option<StaffRecord> {
        let state = self.inner.lock().expect("directory lock");
        state
            .staff
            .values()
            .find(|record| record.email == email)
            .cloned()
    }

    fn find_by_id(&self, kind: Kind, id: PrincipalId) -> Option<Principal> {
        let state = self.inner.lock().expect("directory lock");
        match kind {
            Kind::Admin => state.admins.get(&id.0).cloned().map(Principal::Admin),
            Kind::Student => state.students.get(&id.0).cloned().map(Principal::Student),
            Kind::Staff => state.staff.get(&id.0).cloned().map(Principal::Staff),
        }
    }

    fn email_in_use(&self, email: &str) -> bool {
        let state = self.inner.lock().expect("directory lock");
        state.email_index.contains_key(email)
    }

    fn insert_admin(&self, admin: NewAdmin) -> Result<AdminRecord, DirectoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        state.claim_email(&admin.email, Kind::Admin)?;
        let id = state.allocate_id();
        let record = AdminRecord {
            id,
            first_name: admin.first_name,
            last_name: admin.last_name,
            email: admin.email,
            password_hash: admin.password_hash,
            mobile_no: admin.mobile_no,
            active: true,
        };
        state.admins.insert(id.0, record.clone());
        Ok(record)
    }

    fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, DirectoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        state.claim_email(&student.email, Kind::Student)?;
        let id = state.allocate_id();
        let record = StudentRecord {
            id,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            password_hash: student.password_hash,
            mobile_no: student.mobile_no,
            location: student.location,
            degree: student.degree,
            active: true,
        };
        state.students.insert(id.0, record.clone());
        Ok(record)
    }

    fn insert_staff(&self, staff: NewStaff) -> Result<StaffRecord, DirectoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        state.claim_email(&staff.email, Kind::Staff)?;
        let id = state.allocate_id();
        let record = StaffRecord {
            id,
            first_name: staff.first_name,
            last_name: staff.last_name,
            email: staff.email,
            password_hash: staff.password_hash,
            mobile_no: staff.mobile_no,
            role: staff.role,
            active: true,
        };
        state.staff.insert(id.0, record.clone());
        Ok(record)
    }

    fn set_active(&self, kind: Kind, id: PrincipalId, active: bool) -> Result<(), DirectoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        let found = match kind {
            Kind::Admin => state
                .admins
                .get_mut(&id.0)
                .map(|record| record.active = active)
                .is_some(),
            Kind::Student => state
                .students
                .get_mut(&id.0)
                .map(|record| record.active = active)
                .is_some(),
            Kind::Staff => state
                .staff
                .get_mut(&id.0)
                .map(|record| record.active = active)
                .is_some(),
        };
        if found {
            Ok(())
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    fn delete_staff(&self, id: PrincipalId) -> Result<(), DirectoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        let record = state.staff.remove(&id.0).ok_or(DirectoryError::NotFound)?;
        state.email_index.remove(&record.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_student(email: &str) -> NewStudent {
        NewStudent {
            first_name: "Asha".to_string(),
            last_name: None,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            mobile_no: None,
            location: None,
            degree: None,
        }
    }

    fn new_staff(email: &str) -> NewStaff {
        NewStaff {
            first_name: "Ravi".to_string(),
            last_name: None,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            mobile_no: None,
            role: StaffRole::Hr,
        }
    }

    #[test]
    fn email_is_unique_across_stores() {
        let directory = InMemoryDirectory::new();
        directory
            .insert_student(new_student("shared@campus.edu"))
            .expect("first insert wins");

        match directory.insert_staff(new_staff("shared@campus.edu")) {
            Err(DirectoryError::DuplicateIdentity) => {}
            other => panic!("expected duplicate identity, got {other:?}"),
        }
    }

    #[test]
    fn deleting_staff_releases_the_email() {
        let directory = InMemoryDirectory::new();
        let staff = directory
            .insert_staff(new_staff("hr@campus.edu"))
            .expect("staff inserted");
        directory.delete_staff(staff.id).expect("staff deleted");
        assert!(!directory.email_in_use("hr@campus.edu"));
        directory
            .insert_student(new_student("hr@campus.edu"))
            .expect("email reusable after delete");
    }

    #[test]
    fn concurrent_inserts_produce_one_winner() {
        let directory = Arc::new(InMemoryDirectory::new());
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let directory = directory.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    directory.insert_student(new_student("race@campus.edu"))
                })
            })
            .collect();

        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect();

        let winners = outcomes.iter().filter(|result| result.is_ok()).count();
        assert_eq!(winners, 1, "exactly one registration may win");
        assert!(outcomes
            .iter()
            .any(|result| matches!(result, Err(DirectoryError::DuplicateIdentity))));
    }

    #[test]
    fn find_by_id_filters_by_kind() {
        let directory = InMemoryDirectory::new();
        let student = directory
            .insert_student(new_student("s@campus.edu"))
            .expect("student inserted");

        assert!(directory.find_by_id(Kind::Student, student.id).is_some());
        assert!(directory.find_by_id(Kind::Staff, student.id).is_none());
    }
}
