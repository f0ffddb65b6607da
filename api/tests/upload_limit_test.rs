use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt; // not axum::ServiceExt

use api::auth::generate_jwt;
use api::routes::routes;
use api::state::AppState;
use common::config::Config;
use db::models::user::Role;
use db::test_utils::setup_test_db;

const BOUNDARY: &str = "portal-upload-boundary";

fn init_test_config() {
    unsafe {
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        std::env::set_var("JWT_SECRET", "integration-test-secret");
        std::env::set_var("LOG_FILE", "logs/test-api.log");
        std::env::set_var("STORAGE_ROOT", "target/test-uploads");
    }
    Config::init(".env.test");
}

async fn make_app() -> Router {
    init_test_config();
    let db = setup_test_db().await;
    Router::new()
        .nest("/api", routes())
        .with_state(AppState::new(db))
}

fn student_token() -> String {
    let (token, _) = generate_jwt(1, Role::Student).unwrap();
    token
}

/// A `%PDF`-prefixed blob padded out to `total` bytes.
fn pdf_of_size(total: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(total, b'x');
    bytes
}

fn multipart_upload(uri: &str, token: &str, filename: &str, file: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn accepts_pdf_above_two_megabytes() {
    let app = make_app().await;
    let token = student_token();

    // Larger than axum's stock 2 MB body cap, inside the configured limit.
    let file = pdf_of_size(3 * 1024 * 1024);
    let response = app
        .oneshot(multipart_upload("/api/uploads/cv", &token, "cv.pdf", &file))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["size_bytes"].as_u64(), Some(file.len() as u64));
}

#[tokio::test]
async fn rejects_pdf_over_the_configured_limit() {
    let app = make_app().await;
    let token = student_token();

    // Past MAX_UPLOAD_BYTES but within the body-limit headroom, so the
    // handler's own size check answers.
    let file = pdf_of_size(Config::get().max_upload_bytes as usize + 16 * 1024);
    let response = app
        .oneshot(multipart_upload("/api/uploads/cv", &token, "cv.pdf", &file))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"].as_str(),
        Some("File exceeds the upload size limit")
    );
}

#[tokio::test]
async fn rejects_non_pdf_content() {
    let app = make_app().await;
    let token = student_token();

    let response = app
        .oneshot(multipart_upload(
            "/api/uploads/cv",
            &token,
            "cv.pdf",
            b"plain text, not a document",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"].as_str(),
        Some("Only PDF documents are accepted")
    );
}
