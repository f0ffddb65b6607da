//! Supervisor evaluation endpoints plus the admin reminder sweep.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::claims::AuthUser;
use crate::auth::guards::{allow_admin, allow_supervisor};
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use services::evaluation::{self, RatingSheet};

const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 7;

pub fn evaluations_routes() -> Router<AppState> {
    let supervisor = Router::new()
        .route("/assigned", get(assigned))
        .route("/{id}", put(save_draft))
        .route("/{id}/submit", put(submit))
        .route_layer(from_fn(allow_supervisor));

    let admin = Router::new()
        .route("/reminders/sweep", post(sweep_reminders))
        .route_layer(from_fn(allow_admin));

    supervisor.merge(admin)
}

/// GET /api/evaluations/assigned
async fn assigned(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    match evaluation::assigned(state.db(), user.actor()).await {
        Ok(evaluations) => (
            StatusCode::OK,
            Json(ApiResponse::success(evaluations, "Evaluations retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/evaluations/{id}
///
/// Partial save. Omitted fields keep their stored values.
async fn save_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(sheet): Json<RatingSheet>,
) -> Response {
    match evaluation::save_draft(state.db(), user.actor(), id, sheet).await {
        Ok(saved) => (
            StatusCode::OK,
            Json(ApiResponse::success(saved, "Draft saved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/evaluations/{id}/submit
async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(sheet): Json<RatingSheet>,
) -> Response {
    match evaluation::submit(state.db(), user.actor(), id, sheet).await {
        Ok(submitted) => (
            StatusCode::OK,
            Json(ApiResponse::success(submitted, "Evaluation submitted")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SweepRequest {
    pub window_days: Option<i64>,
}

/// POST /api/evaluations/reminders/sweep (admin)
///
/// On-demand reminder pass over unsubmitted evaluations; there is no
/// background scheduler.
async fn sweep_reminders(
    State(state): State<AppState>,
    Json(req): Json<SweepRequest>,
) -> Response {
    let window = req.window_days.unwrap_or(DEFAULT_REMINDER_WINDOW_DAYS);
    let today = Utc::now().date_naive();

    match evaluation::send_due_reminders(state.db(), today, window).await {
        Ok(sent) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                json!({ "reminders_sent": sent }),
                "Reminder sweep complete",
            )),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
