//! Registration, login and password rotation.

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::post,
};
use common::format_validation_errors;
use db::models::student_profile::{Gender, Program};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::auth::{generate_jwt, guards::allow_authenticated};
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use services::account::{self, RegisterStudent};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/change-password",
            post(change_password).route_layer(from_fn(allow_authenticated)),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub password_confirmation: String,

    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(equal = 8, message = "NIM must be exactly 8 digits"))]
    pub nim: String,

    pub program: Program,
    pub cohort_year: String,
    pub gender: Gender,

    #[validate(length(min = 1, message = "WhatsApp number is required"))]
    pub whatsapp: String,

    pub phone_number: Option<String>,

    #[validate(length(min = 1, message = "Consultation document is required"))]
    pub consultation_doc_path: String,

    #[validate(length(min = 1, message = "SPTJM document is required"))]
    pub sptjm_doc_path: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_at: String,
    pub force_password_change: bool,
}

/// POST /api/auth/register
///
/// Student self-registration. Creates the account and profile, auto-approved.
async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        )
            .into_response();
    }

    let input = RegisterStudent {
        email: req.email,
        password: req.password,
        password_confirmation: req.password_confirmation,
        full_name: req.full_name,
        nim: req.nim,
        program: req.program,
        cohort_year: req.cohort_year,
        gender: req.gender,
        whatsapp: req.whatsapp,
        phone_number: req.phone_number,
        consultation_doc_path: req.consultation_doc_path,
        sptjm_doc_path: req.sptjm_doc_path,
    };

    match account::register_student(state.db(), input).await {
        Ok((user, profile)) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                json!({ "user": user, "profile": profile }),
                "Registration successful",
            )),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let user = match account::verify_credentials(state.db(), &req.email, &req.password).await {
        Ok(user) => user,
        Err(err) => return service_error_response(err).into_response(),
    };

    match generate_jwt(user.id, user.role) {
        Ok((token, expires_at)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                LoginResponse {
                    id: user.id,
                    email: user.email,
                    role: user.role.to_string(),
                    token,
                    expires_at,
                    force_password_change: user.force_password_change,
                },
                "Login successful",
            )),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "token encoding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal server error")),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// POST /api/auth/change-password
///
/// Also clears the supervisor first-login flag.
async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ChangePasswordRequest>,
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

    match account::change_password(
        state.db(),
        user.0.sub,
        &req.current_password,
        &req.new_password,
    )
    .await
    {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Password changed")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
