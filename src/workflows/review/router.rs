//! HTTP surface for the review workflow.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::identity::gate::AuthContext;

use super::domain::{ApplicationId, PostingId, ReviewStatus, SubmissionDetails};
use super::repository::{ApplicationRepository, NotificationPublisher, PostingBoard};
use super::service::{ReviewWorkflow, WorkflowError};

/// Router builder exposing intake, review, and withdrawal endpoints.
pub fn review_router<R, P, N>(service: Arc<ReviewWorkflow<R, P, N>>) -> Router
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(apply_handler::<R, P, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<R, P, N>).delete(withdraw_handler::<R, P, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(status_handler::<R, P, N>),
        )
        .route(
            "/api/v1/applications/:application_id/notes",
            patch(notes_handler::<R, P, N>),
        )
        .route(
            "/api/v1/applications/bulk-status",
            post(bulk_status_handler::<R, P, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub posting_id: u64,
    #[serde(flatten)]
    pub submission: SubmissionDetails,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub application_ids: Vec<u64>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkStatusResponse {
    pub requested: usize,
    pub updated: usize,
}

fn parse_status(raw: &str) -> Result<ReviewStatus, AppError> {
    ReviewStatus::parse(raw)
        .ok_or_else(|| AppError::Workflow(WorkflowError::InvalidStatus(raw.to_string())))
}

pub(crate) async fn apply_handler<R, P, N>(
    context: AuthContext,
    State(service): State<Arc<ReviewWorkflow<R, P, N>>>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.apply(&context, PostingId(request.posting_id), request.submission)?;
    Ok((StatusCode::CREATED, axum::Json(record.view())).into_response())
}

pub(crate) async fn get_handler<R, P, N>(
    context: AuthContext,
    State(service): State<Arc<ReviewWorkflow<R, P, N>>>,
    Path(application_id): Path<u64>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.get(&context, ApplicationId(application_id))?;
    Ok((StatusCode::OK, axum::Json(record.view())).into_response())
}

pub(crate) async fn withdraw_handler<R, P, N>(
    context: AuthContext,
    State(service): State<Arc<ReviewWorkflow<R, P, N>>>,
    Path(application_id): Path<u64>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    service.withdraw(&context, ApplicationId(application_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn status_handler<R, P, N>(
    context: AuthContext,
    State(service): State<Arc<ReviewWorkflow<R, P, N>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<StatusRequest>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    let status = parse_status(&request.status)?;
    let record = service.transition(&context, ApplicationId(application_id), status, request.notes)?;
    Ok((StatusCode::OK, axum::Json(record.view())).into_response())
}

pub(crate) async fn notes_handler<R, P, N>(
    context: AuthContext,
    State(service): State<Arc<ReviewWorkflow<R, P, N>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<NotesRequest>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.update_notes(&context, ApplicationId(application_id), request.notes)?;
    Ok((StatusCode::OK, axum::Json(record.view())).into_response())
}

pub(crate) async fn bulk_status_handler<R, P, N>(
    context: AuthContext,
    State(service): State<Arc<ReviewWorkflow<R, P, N>>>,
    axum::Json(request): axum::Json<BulkStatusRequest>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
    P: PostingBoard + 'static,
    N: NotificationPublisher + 'static,
{
    // Validate the target status once, before touching any record.
    let status = parse_status(&request.status)?;
    let ids: Vec<ApplicationId> = request
        .application_ids
        .iter()
        .copied()
        .map(ApplicationId)
        .collect();

    let updated = service.bulk_transition(&context, &ids, status, request.notes)?;
    let body = BulkStatusResponse {
        requested: ids.len(),
        updated,
    };
    Ok((StatusCode::OK, axum::Json(body)).into_response())
}
