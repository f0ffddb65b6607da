//! Placement lifecycle endpoints.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::auth::guards::{allow_admin, allow_student};
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use common::format_validation_errors;
use services::placement::{self, OfferDetails};

pub fn placements_routes() -> Router<AppState> {
    let student = Router::new()
        .route("/", post(create))
        .route("/mine", get(mine))
        .route_layer(from_fn(allow_student));

    let admin = Router::new()
        .route("/{id}/confirm", put(confirm))
        .route("/{id}/complete", put(complete))
        .route("/{id}/terminate", put(terminate))
        .route_layer(from_fn(allow_admin));

    student.merge(admin)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportOfferRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,

    #[validate(length(min = 1, message = "Company address is required"))]
    pub company_address: String,

    pub company_industry: String,

    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(length(min = 1, message = "Supervisor name is required"))]
    pub supervisor_name: String,

    #[validate(email(message = "Invalid supervisor email"))]
    pub supervisor_email: String,

    pub supervisor_whatsapp: String,
    pub supervisor_position: String,

    #[validate(length(min = 1, message = "Acceptance letter is required"))]
    pub acceptance_letter_path: String,
}

/// POST /api/placements
///
/// Student reports an accepted offer; the placement waits for admin
/// confirmation.
async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ReportOfferRequest>,
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

    let details = OfferDetails {
        company_name: req.company_name,
        company_address: req.company_address,
        company_industry: req.company_industry,
        position: req.position,
        start_date: req.start_date,
        end_date: req.end_date,
        supervisor_name: req.supervisor_name,
        supervisor_email: req.supervisor_email,
        supervisor_whatsapp: req.supervisor_whatsapp,
        supervisor_position: req.supervisor_position,
        acceptance_letter_path: req.acceptance_letter_path,
    };

    match placement::create_from_offer(state.db(), user.actor(), details).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(created, "Placement reported")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// GET /api/placements/mine
async fn mine(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    match placement::mine(state.db(), user.actor()).await {
        Ok(placements) => (
            StatusCode::OK,
            Json(ApiResponse::success(placements, "Placements retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/placements/{id}/confirm (admin)
async fn confirm(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match placement::confirm(state.db(), user.actor(), id).await {
        Ok(confirmed) => (
            StatusCode::OK,
            Json(ApiResponse::success(confirmed, "Placement confirmed")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/placements/{id}/complete (admin)
async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match placement::complete(state.db(), user.actor(), id).await {
        Ok(completed) => (
            StatusCode::OK,
            Json(ApiResponse::success(completed, "Placement completed")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/placements/{id}/terminate (admin)
async fn terminate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match placement::terminate(state.db(), user.actor(), id).await {
        Ok(terminated) => (
            StatusCode::OK,
            Json(ApiResponse::success(terminated, "Placement terminated")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
