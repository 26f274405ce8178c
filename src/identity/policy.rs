//! Static authorization table.
//!
//! Maps `{role, operation}` to allow/deny. The table is read-only and shared
//! by every request; ownership checks (a student touching only their own
//! application) live in the workflow, not here.

use super::principal::Role;

/// Operations guarded by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Drive an application through the review status machine.
    DriveTransition,
    /// Create admin/staff accounts.
    ManagePrincipals,
    /// Remove a staff account.
    DeleteStaff,
    /// Submit an application against a posting.
    ApplyForPosting,
    /// Withdraw an own pending application.
    WithdrawApplication,
    /// Read applications other than one's own.
    ViewApplications,
}

pub fn allows(role: Role, operation: Operation) -> bool {
    match operation {
        Operation::DriveTransition | Operation::ViewApplications => {
            matches!(role, Role::Admin | Role::Hr | Role::Faculty)
        }
        Operation::ManagePrincipals | Operation::DeleteStaff => matches!(role, Role::Admin),
        Operation::ApplyForPosting | Operation::WithdrawApplication => {
            matches!(role, Role::Student)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviewers_drive_transitions_students_do_not() {
        for role in [Role::Admin, Role::Hr, Role::Faculty] {
            assert!(allows(role, Operation::DriveTransition), "{role} may review");
        }
        assert!(!allows(Role::Student, Operation::DriveTransition));
    }

    #[test]
    fn only_admin_manages_principals() {
        assert!(allows(Role::Admin, Operation::ManagePrincipals));
        assert!(allows(Role::Admin, Operation::DeleteStaff));
        for role in [Role::Hr, Role::Faculty, Role::Student] {
            assert!(!allows(role, Operation::ManagePrincipals));
            assert!(!allows(role, Operation::DeleteStaff));
        }
    }

    #[test]
    fn only_students_apply_and_withdraw() {
        assert!(allows(Role::Student, Operation::ApplyForPosting));
        assert!(allows(Role::Student, Operation::WithdrawApplication));
        for role in [Role::Admin, Role::Hr, Role::Faculty] {
            assert!(!allows(role, Operation::ApplyForPosting));
            assert!(!allows(role, Operation::WithdrawApplication));
        }
    }
}
