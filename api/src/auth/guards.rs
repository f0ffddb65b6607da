//! Role-based route guards.
//!
//! Each guard verifies the Bearer token, checks the role carried in the
//! claims, and inserts the `AuthUser` into request extensions for handlers.

use axum::{
    Json,
    body::Body,
    extract::FromRequestParts,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::user::Role;

use crate::auth::claims::AuthUser;
use crate::response::{ApiResponse, Empty};

type GuardRejection = (StatusCode, Json<ApiResponse<Empty>>);

async fn extract_and_insert(
    mut req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), GuardRejection> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &()).await?;

    req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

fn forbidden() -> GuardRejection {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::error("Insufficient permissions")),
    )
}

pub async fn allow_authenticated(
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    let (req, _) = extract_and_insert(req).await?;
    Ok(next.run(req).await)
}

pub async fn allow_admin(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert(req).await?;
    if user.0.role != Role::Admin {
        return Err(forbidden());
    }
    Ok(next.run(req).await)
}

pub async fn allow_student(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert(req).await?;
    if user.0.role != Role::Student {
        return Err(forbidden());
    }
    Ok(next.run(req).await)
}

pub async fn allow_supervisor(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert(req).await?;
    if user.0.role != Role::Supervisor {
        return Err(forbidden());
    }
    Ok(next.run(req).await)
}
