use sea_orm::DbErr;
use thiserror::Error;

/// Error surface of the service layer. Handlers map these onto HTTP status
/// codes; anything not listed here is a bug, not a client error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("not allowed")]
    Forbidden,

    #[error("report has {got} words; at least {need} required")]
    WordCountShortfall { got: usize, need: usize },

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
