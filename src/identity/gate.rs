//! Request authentication gate.
//!
//! Every request passes through [`authenticate`]: tokens are validated and
//! their subjects re-resolved against the live directory, so a deactivated or
//! deleted principal is locked out the moment the store changes, not when the
//! token expires. Requests without a usable token continue anonymously; the
//! per-route extractor is what turns a missing context into a 401.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::AppError;

use super::directory::PrincipalDirectory;
use super::principal::{Kind, PrincipalId, Role};
use super::resolver::IdentityResolver;
use super::token::TokenService;

/// Authenticated caller attached to a request after gate checks pass.
///
/// The role comes from the live directory record, not the token, so a role
/// change takes effect on the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub principal_id: PrincipalId,
    pub kind: Kind,
    pub role: Role,
}

pub struct AuthGate<D> {
    resolver: IdentityResolver<D>,
    tokens: Arc<TokenService>,
}

impl<D: PrincipalDirectory> AuthGate<D> {
    pub fn new(directory: Arc<D>, tokens: Arc<TokenService>) -> Self {
        Self {
            resolver: IdentityResolver::new(directory),
            tokens,
        }
    }

    /// Validate a bearer header value and re-resolve its subject.
    ///
    /// Returns `None` for any failure: missing scheme, bad signature, expiry,
    /// an unknown subject, or a deactivated principal.
    pub fn context_for(&self, header_value: &str) -> Option<AuthContext> {
        let token = bearer_token(header_value)?;
        let claims = match self.tokens.validate(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(%err, "session token rejected");
                return None;
            }
        };

        let principal = self
            .resolver
            .resolve_id(claims.kind, PrincipalId(claims.sub))?;
        if !principal.active() {
            debug!(principal = %principal.id(), "token subject is deactivated");
            return None;
        }

        Some(AuthContext {
            principal_id: principal.id(),
            kind: principal.kind(),
            role: principal.role(),
        })
    }
}

fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware layered over the whole router. Attaches an [`AuthContext`] when
/// a valid token is presented and continues anonymously otherwise.
pub async fn authenticate<D: PrincipalDirectory>(
    State(gate): State<Arc<AuthGate<D>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| gate.context_for(value));

    if let Some(context) = context {
        request.extensions_mut().insert(context);
    }

    next.run(request).await
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AppError::Unauthenticated)
    }
}
