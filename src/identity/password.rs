//! Password hashing with Argon2id.
//!
//! Hashes are stored in PHC string format; verification is constant-time via
//! the `argon2` crate. The stored hash is never logged or returned to callers.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};

use super::IdentityError;

/// Hash a plaintext secret with a fresh random salt.
pub fn hash(secret: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::Hash)
}

/// Verify a presented secret against a stored PHC-format hash.
///
/// Malformed or empty stored hashes verify as false rather than erroring; a
/// principal with a corrupt hash simply cannot log in.
pub fn verify(secret: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hashed = hash("correct horse battery").expect("hashing succeeds");
        assert!(hashed.starts_with("$argon2"));
        assert!(verify("correct horse battery", &hashed));
        assert!(!verify("wrong secret", &hashed));
    }

    #[test]
    fn same_secret_hashes_differently_per_salt() {
        let first = hash("s3cret").expect("hashing succeeds");
        let second = hash("s3cret").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify("anything", ""));
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
