pub mod events;
pub mod models;
pub mod test_utils;

use common::config::Config;
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;

/// Connects using `DATABASE_URL`. A bare file path is treated as a SQLite
/// database file; a DSN is used as-is.
pub async fn connect() -> DatabaseConnection {
    let path_or_url = Config::get().database_url.clone();
    let url = if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        path_or_url
    } else {
        // SQLite won't create intermediate directories.
        if let Some(parent) = Path::new(&path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    Database::connect(&url)
        .await
        .expect("Failed to connect to database")
}
