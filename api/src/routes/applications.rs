//! Application pipeline endpoints.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use db::models::application::ApplicationStatus;
use serde::Deserialize;

use crate::auth::claims::AuthUser;
use crate::auth::guards::{allow_admin, allow_student};
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use services::application;

pub fn applications_routes() -> Router<AppState> {
    let student = Router::new()
        .route("/", post(submit))
        .route("/mine", get(mine))
        .route("/{id}/withdraw", put(withdraw))
        .route_layer(from_fn(allow_student));

    let admin = Router::new()
        .route("/{id}/status", put(set_status))
        .route_layer(from_fn(allow_admin));

    student.merge(admin)
}

#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub job_posting_id: i64,
    pub cover_letter: String,
    pub cv_path: String,
}

/// POST /api/applications
async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SubmitApplicationRequest>,
) -> Response {
    match application::submit(
        state.db(),
        user.actor(),
        req.job_posting_id,
        &req.cover_letter,
        &req.cv_path,
    )
    .await
    {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(created, "Application submitted")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// GET /api/applications/mine
async fn mine(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    match application::mine(state.db(), user.actor()).await {
        Ok(applications) => (
            StatusCode::OK,
            Json(ApiResponse::success(applications, "Applications retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

/// PUT /api/applications/{id}/status (admin)
async fn set_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> Response {
    match application::advance(
        state.db(),
        user.actor(),
        id,
        req.status,
        req.notes.as_deref(),
    )
    .await
    {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Application status updated")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/applications/{id}/withdraw
async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match application::withdraw(state.db(), user.actor(), id).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Application withdrawn")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
