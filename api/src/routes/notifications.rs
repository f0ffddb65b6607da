//! Notification inbox endpoints.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::json;

use crate::auth::claims::AuthUser;
use crate::auth::guards::allow_authenticated;
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use services::notification;

pub fn notifications_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inbox))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", put(mark_read))
        .route("/read-all", put(mark_all_read))
        .route_layer(from_fn(allow_authenticated))
}

/// GET /api/notifications
async fn inbox(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    match notification::inbox(state.db(), user.actor()).await {
        Ok(notifications) => (
            StatusCode::OK,
            Json(ApiResponse::success(notifications, "Notifications retrieved")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// GET /api/notifications/unread-count
async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match notification::unread_count(state.db(), user.actor()).await {
        Ok(count) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                json!({ "unread": count }),
                "Unread count retrieved",
            )),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match notification::mark_read(state.db(), user.actor(), id).await {
        Ok(marked) => (
            StatusCode::OK,
            Json(ApiResponse::success(marked, "Notification marked as read")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/notifications/read-all
async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match notification::mark_all_read(state.db(), user.actor()).await {
        Ok(marked) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                json!({ "marked": marked }),
                "All notifications marked as read",
            )),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
