//! Job posting browsing plus admin posting management.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use db::models::job_posting::{JobStatus, WorkType};
use serde::Deserialize;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::auth::guards::{allow_admin, allow_authenticated};
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use common::format_validation_errors;
use services::catalog::{self, JobPostingInput};

pub fn jobs_routes() -> Router<AppState> {
    let browse = Router::new()
        .route("/", get(list_open))
        .route("/{id}", get(get_posting))
        .route_layer(from_fn(allow_authenticated));

    let admin = Router::new()
        .route("/", post(create))
        .route("/{id}", put(update))
        .route("/{id}/status", put(set_status))
        .route("/{id}", delete(remove))
        .route_layer(from_fn(allow_admin));

    browse.merge(admin)
}

/// GET /api/jobs
async fn list_open(State(state): State<AppState>) -> Response {
    match catalog::browse_open(state.db()).await {
        Ok(postings) => (
            StatusCode::OK,
            Json(ApiResponse::success(postings, "Open postings retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// GET /api/jobs/{id}
///
/// Only `Open` postings are visible here; drafts and closed postings return
/// 404.
async fn get_posting(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match catalog::get_open(state.db(), id).await {
        Ok(posting) => (
            StatusCode::OK,
            Json(ApiResponse::success(posting, "Posting retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct JobPostingRequest {
    pub company_id: i64,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub requirements: String,
    pub benefits: Option<String>,
    pub work_type: WorkType,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub duration_months: i32,
    pub slots_available: i32,
    pub application_deadline: NaiveDate,
    pub status: JobStatus,
}

impl From<JobPostingRequest> for JobPostingInput {
    fn from(req: JobPostingRequest) -> Self {
        JobPostingInput {
            company_id: req.company_id,
            title: req.title,
            description: req.description,
            requirements: req.requirements,
            benefits: req.benefits,
            work_type: req.work_type,
            location: req.location,
            duration_months: req.duration_months,
            slots_available: req.slots_available,
            application_deadline: req.application_deadline,
            status: req.status,
        }
    }
}

/// POST /api/jobs (admin)
async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<JobPostingRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        )
            .into_response();
    }

    match catalog::create_job(state.db(), user.actor(), req.into()).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(created, "Posting created")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/jobs/{id} (admin)
async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<JobPostingRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        )
            .into_response();
    }

    match catalog::update_job(state.db(), user.actor(), id, req.into()).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Posting updated")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetJobStatusRequest {
    pub status: JobStatus,
}

/// PUT /api/jobs/{id}/status (admin)
async fn set_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetJobStatusRequest>,
) -> Response {
    match catalog::set_job_status(state.db(), user.actor(), id, req.status).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Posting status updated")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// DELETE /api/jobs/{id} (admin)
async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match catalog::delete_job(state.db(), user.actor(), id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({}), "Posting deleted")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
