//! Unified identity and session layer.
//!
//! One credential surface resolves against three disjoint principal stores
//! (admins, students, staff) and issues stateless signed session tokens that
//! are re-validated — and their subjects re-resolved — on every request.

pub mod directory;
pub mod gate;
pub mod password;
pub mod policy;
pub mod principal;
pub mod resolver;
pub mod router;
pub mod service;
pub mod token;

pub use directory::{InMemoryDirectory, PrincipalDirectory};
pub use gate::{AuthContext, AuthGate};
pub use principal::{Kind, Principal, PrincipalId, Role, StaffRole};
pub use resolver::IdentityResolver;
pub use service::AuthService;
pub use token::{Claims, TokenError, TokenService};

use directory::DirectoryError;

/// Failures raised by the identity layer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("email already registered")]
    DuplicateIdentity,
    /// Unknown email, wrong password, and deactivated accounts all collapse
    /// into this one answer.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("principal not found")]
    NotFound,
    #[error("operation not permitted for this role")]
    Forbidden,
    #[error("failed to hash credential")]
    Hash,
    #[error("failed to issue session token")]
    TokenIssue,
}

impl From<DirectoryError> for IdentityError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::DuplicateIdentity => IdentityError::DuplicateIdentity,
            DirectoryError::NotFound => IdentityError::NotFound,
        }
    }
}
