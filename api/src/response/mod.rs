use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use services::ServiceError;

/// Response wrapper shared by every endpoint:
///
/// ```json
/// { "success": true, "data": { ... }, "message": "..." }
/// ```
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

impl ApiResponse<Empty> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Empty,
            message: message.into(),
        }
    }
}

/// Empty `data` payload for error responses.
#[derive(Serialize, Default)]
pub struct Empty;

/// Maps service errors onto status codes. Database failures come back as an
/// opaque 500; the detail goes to the log, not the client.
pub fn service_error_response(err: ServiceError) -> (StatusCode, Json<ApiResponse<Empty>>) {
    let status = match &err {
        ServiceError::Validation(_) | ServiceError::WordCountShortfall { .. } => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::Duplicate(_) | ServiceError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &err {
        ServiceError::Db(db_err) => {
            tracing::error!(error = %db_err, "unexpected database error");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };

    (status, Json(ApiResponse::error(message)))
}
