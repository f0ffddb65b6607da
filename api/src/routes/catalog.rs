//! Admin company catalog management.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{delete, post, put},
};
use db::models::company::Industry;
use serde::Deserialize;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::auth::guards::allow_admin;
use crate::response::{ApiResponse, service_error_response};
use crate::state::AppState;
use common::format_validation_errors;
use services::catalog::{self, CompanyInput};

pub fn companies_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", put(update))
        .route("/{id}", delete(remove))
        .route_layer(from_fn(allow_admin))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,

    pub industry: Industry,
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Company address is required"))]
    pub address: String,

    pub website: Option<String>,
}

impl From<CompanyRequest> for CompanyInput {
    fn from(req: CompanyRequest) -> Self {
        CompanyInput {
            name: req.name,
            industry: req.industry,
            description: req.description,
            address: req.address,
            website: req.website,
        }
    }
}

/// POST /api/companies
async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CompanyRequest>,
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

    match catalog::create_company(state.db(), user.actor(), req.into()).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(created, "Company created")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// PUT /api/companies/{id}
async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<CompanyRequest>,
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

    match catalog::update_company(state.db(), user.actor(), id, req.into()).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated, "Company updated")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}

/// DELETE /api/companies/{id}
///
/// Postings under the company are removed by the FK cascade.
async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match catalog::delete_company(state.db(), user.actor(), id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({}), "Company deleted")),
        )
            .into_response(),
        Err(err) => service_error_response(err).into_response(),
    }
}
