use crate::config::ConfigError;
use crate::identity::{IdentityError, TokenError};
use crate::telemetry::TelemetryError;
use crate::workflows::review::WorkflowError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Identity(IdentityError),
    Token(TokenError),
    Workflow(WorkflowError),
    /// No usable session token was presented on a protected route.
    Unauthenticated,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Identity(err) => write!(f, "{}", err),
            AppError::Token(err) => write!(f, "{}", err),
            AppError::Workflow(err) => write!(f, "{}", err),
            AppError::Unauthenticated => write!(f, "authentication required"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Identity(err) => Some(err),
            AppError::Token(err) => Some(err),
            AppError::Workflow(err) => Some(err),
            AppError::Unauthenticated => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Identity(err) => identity_status(err),
            AppError::Workflow(err) => workflow_status(err),
            AppError::Token(_) | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

fn identity_status(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        IdentityError::DuplicateIdentity => StatusCode::CONFLICT,
        IdentityError::NotFound => StatusCode::NOT_FOUND,
        IdentityError::Forbidden => StatusCode::FORBIDDEN,
        IdentityError::Hash | IdentityError::TokenIssue => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::NotFound | WorkflowError::PostingNotFound => StatusCode::NOT_FOUND,
        WorkflowError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        WorkflowError::InvalidTransition { .. } | WorkflowError::PostingNotOpen => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkflowError::AlreadyApplied | WorkflowError::Conflict => StatusCode::CONFLICT,
        WorkflowError::Forbidden => StatusCode::FORBIDDEN,
        WorkflowError::Repository(_) | WorkflowError::Notification(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<TokenError> for AppError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}
