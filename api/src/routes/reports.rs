//! Monthly report endpoints.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::auth::claims::AuthUser;
use crate::auth::guards::{allow_admin, allow_student};
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use services::report::{self, ReportForm};

pub fn reports_routes() -> Router<AppState> {
    let student = Router::new()
        .route("/", post(create))
        .route("/mine", get(mine))
        .route("/{id}", put(update))
        .route("/{id}/submit", put(submit))
        .route_layer(from_fn(allow_student));

    let admin = Router::new()
        .route("/{id}/review", put(review))
        .route("/{id}/request-revision", put(request_revision))
        .route_layer(from_fn(allow_admin));

    student.merge(admin)
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub month: i32,
    pub year: i32,
    pub company_profile: Option<String>,
    pub job_description: String,
    pub work_environment: String,
    pub useful_skills: String,
    pub needed_skills: String,
    pub achievements: String,
    pub challenges: String,
    pub next_month_plan: String,
}

impl From<ReportRequest> for ReportForm {
    fn from(req: ReportRequest) -> Self {
        ReportForm {
            month: req.month,
            year: req.year,
            company_profile: req.company_profile,
            job_description: req.job_description,
            work_environment: req.work_environment,
            useful_skills: req.useful_skills,
            needed_skills: req.needed_skills,
            achievements: req.achievements,
            challenges: req.challenges,
            next_month_plan: req.next_month_plan,
        }
    }
}

/// POST /api/reports
async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ReportRequest>,
) -> Response {
    match report::create_draft(state.db(), user.actor(), req.into()).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(created, "Report draft created")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/reports/{id}
async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<ReportRequest>,
) -> Response {
    match report::update_draft(state.db(), user.actor(), id, req.into()).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Report updated")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/reports/{id}/submit
async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match report::submit(state.db(), user.actor(), id).await {
        Ok(submitted) => (
            StatusCode::OK,
            Json(ApiResponse::success(submitted, "Report submitted")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// GET /api/reports/mine
async fn mine(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    match report::mine(state.db(), user.actor()).await {
        Ok(reports) => (
            StatusCode::OK,
            Json(ApiResponse::success(reports, "Reports retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub feedback: Option<String>,
}

/// PUT /api/reports/{id}/review (admin)
async fn review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Response {
    match report::review(state.db(), user.actor(), id, req.feedback.as_deref()).await {
        Ok(reviewed) => (
            StatusCode::OK,
            Json(ApiResponse::success(reviewed, "Report reviewed")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct RevisionRequest {
    pub feedback: String,
}

/// PUT /api/reports/{id}/request-revision (admin)
async fn request_revision(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<RevisionRequest>,
) -> Response {
    match report::request_revision(state.db(), user.actor(), id, &req.feedback).await {
        Ok(returned) => (
            StatusCode::OK,
            Json(ApiResponse::success(returned, "Revision requested")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
