use api::routes::routes;
use api::state::AppState;
use axum::Router;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use common::config::Config;
use migration::{Migrator, MigratorTrait};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    let config = Config::init(".env");
    let _log_guard = common::logger::init(&config.log_file, &config.log_level, config.log_to_stdout);

    let db = db::connect().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(db);

    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    let app = Router::new()
        .nest("/api", routes())
        .with_state(state)
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!(
        "Starting {} on http://{}:{}",
        config.project_name,
        config.host,
        config.port
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server crashed");
}
