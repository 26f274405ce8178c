//! HTTP surface for authentication and principal management.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::directory::PrincipalDirectory;
use super::gate::AuthContext;
use super::principal::{Principal, PrincipalId, PrincipalView, StaffRole};
use super::service::{AuthService, StaffInvitation, StudentRegistration};

/// Router builder exposing login, registration, and staff administration.
pub fn auth_router<D>(service: Arc<AuthService<D>>) -> Router
where
    D: PrincipalDirectory + 'static,
{
    Router::new()
        .route("/api/v1/auth/register", post(register_handler::<D>))
        .route("/api/v1/auth/login", post(login_handler::<D>))
        .route("/api/v1/admin/staff", post(create_staff_handler::<D>))
        .route(
            "/api/v1/admin/staff/:staff_id",
            delete(delete_staff_handler::<D>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
    pub location: Option<String>,
    pub degree: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StaffRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
    pub role: StaffRole,
}

/// Session payload returned by login and registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PrincipalView,
}

pub(crate) async fn login_handler<D>(
    State(service): State<Arc<AuthService<D>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Result<Response, AppError>
where
    D: PrincipalDirectory + 'static,
{
    let session = service.login(&request.email, &request.password)?;
    let response = AuthResponse {
        token: session.token,
        user: PrincipalView::from(&session.principal),
    };
    Ok((StatusCode::OK, axum::Json(response)).into_response())
}

pub(crate) async fn register_handler<D>(
    State(service): State<Arc<AuthService<D>>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Result<Response, AppError>
where
    D: PrincipalDirectory + 'static,
{
    let session = service.register_student(StudentRegistration {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        password: request.password,
        mobile_no: request.mobile_no,
        location: request.location,
        degree: request.degree,
    })?;
    let response = AuthResponse {
        token: session.token,
        user: PrincipalView::from(&session.principal),
    };
    Ok((StatusCode::CREATED, axum::Json(response)).into_response())
}

pub(crate) async fn create_staff_handler<D>(
    context: AuthContext,
    State(service): State<Arc<AuthService<D>>>,
    axum::Json(request): axum::Json<StaffRequest>,
) -> Result<Response, AppError>
where
    D: PrincipalDirectory + 'static,
{
    let staff = service.create_staff(
        &context,
        StaffInvitation {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            mobile_no: request.mobile_no,
            role: request.role,
        },
    )?;
    let view = PrincipalView::from(&Principal::Staff(staff));
    Ok((StatusCode::CREATED, axum::Json(view)).into_response())
}

pub(crate) async fn delete_staff_handler<D>(
    context: AuthContext,
    State(service): State<Arc<AuthService<D>>>,
    Path(staff_id): Path<u64>,
) -> Result<Response, AppError>
where
    D: PrincipalDirectory + 'static,
{
    service.delete_staff(&context, PrincipalId(staff_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
