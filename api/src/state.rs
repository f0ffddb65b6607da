use sea_orm::DbConn;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<DbConn>,
}

impl AppState {
    pub fn new(db: DbConn) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn db(&self) -> &DbConn {
        &self.db
    }
}
