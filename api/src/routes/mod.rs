//! HTTP entry points under the `/api` namespace, grouped by domain:
//!
//! - `/health` → liveness probe (public)
//! - `/auth` → registration, login, password change
//! - `/jobs` → open posting browsing (authenticated)
//! - `/applications` → application pipeline (student + admin)
//! - `/placements` → placement lifecycle (student + admin)
//! - `/reports` → monthly reports (student + admin)
//! - `/evaluations` → supervisor evaluations
//! - `/notifications` → in-app inbox (authenticated)
//! - `/companies` → admin catalog management
//! - `/uploads` → PDF document intake (authenticated)

use axum::Router;

pub mod applications;
pub mod auth;
pub mod catalog;
pub mod evaluations;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod placements;
pub mod reports;
pub mod uploads;

use crate::state::AppState;

/// Builds the complete `/api` router. Guards are attached per group so the
/// role rules live next to the routes they protect.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/jobs", jobs::jobs_routes())
        .nest("/applications", applications::applications_routes())
        .nest("/placements", placements::placements_routes())
        .nest("/reports", reports::reports_routes())
        .nest("/evaluations", evaluations::evaluations_routes())
        .nest("/notifications", notifications::notifications_routes())
        .nest("/companies", catalog::companies_routes())
        .nest("/uploads", uploads::uploads_routes())
}
