use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // not axum::ServiceExt

use api::routes::routes;
use api::state::AppState;
use common::config::Config;
use db::test_utils::setup_test_db;

fn init_test_config() {
    unsafe {
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        std::env::set_var("JWT_SECRET", "integration-test-secret");
        std::env::set_var("LOG_FILE", "logs/test-api.log");
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

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_payload() -> Value {
    json!({
        "email": "budi@student.prasetiyamulya.ac.id",
        "password": "password123",
        "password_confirmation": "password123",
        "full_name": "Budi Santoso",
        "nim": "12345678",
        "program": "CSE",
        "cohort_year": "2022",
        "gender": "Male",
        "whatsapp": "+628123456789",
        "consultation_doc_path": "consultation/budi.pdf",
        "sptjm_doc_path": "sptjm/budi.pdf"
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check_is_public() {
    let app = make_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_then_login_returns_token() {
    let app = make_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", &register_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["profile"]["nim"].as_str(),
        Some("12345678")
    );

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            &json!({
                "email": "budi@student.prasetiyamulya.ac.id",
                "password": "password123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "student");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_rejects_non_university_email() {
    let app = make_app().await;

    let mut payload = register_payload();
    payload["email"] = json!("budi@gmail.com");

    let response = app
        .oneshot(post_json("/api/auth/register", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = make_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", &register_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            &json!({
                "email": "budi@student.prasetiyamulya.ac.id",
                "password": "wrong-password"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn jobs_require_authentication() {
    let app = make_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/jobs")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_student_can_browse_jobs() {
    let app = make_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", &register_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({
                "email": "budi@student.prasetiyamulya.ac.id",
                "password": "password123"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/jobs")
                .method("GET")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!([]));
}
