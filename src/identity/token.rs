//! Stateless session tokens.
//!
//! Tokens are HMAC-SHA256 signed claim sets carrying the subject id, the
//! principal kind, and the role. The signing secret is process-wide, loaded
//! once at startup, and shared read-only by every validator; there is no
//! refresh mechanism, so expiry forces re-authentication.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

use super::principal::{Kind, Principal, Role};

/// Signed claim set embedded in a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal id within its kind's store.
    pub sub: u64,
    pub kind: Kind,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, malformed payload, or wrong issuer. Callers must
    /// treat this and `Expired` identically: deny access.
    #[error("session token is invalid")]
    Invalid,
    #[error("session token has expired")]
    Expired,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.issuer.clone(),
            config.token_ttl_secs(),
        )
    }

    /// Issue a token for a resolved principal with the configured lifetime.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: principal.id().0,
            kind: principal.kind(),
            role: principal.role(),
            iat: now,
            exp: now + self.ttl_secs,
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Invalid)
    }

    /// Validate signature, expiry, and issuer, failing closed on anything
    /// unexpected. Expiry is exact: no leeway window.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
