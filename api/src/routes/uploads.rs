//! PDF document intake.
//!
//! Documents are stored on local disk under `STORAGE_ROOT/<kind>/` and the
//! relative path is returned for use in registration, application and
//! placement payloads.

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::claims::AuthUser;
use crate::auth::guards::allow_authenticated;
use crate::response::ApiResponse;
use crate::state::AppState;
use common::config::Config;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Headroom on top of `MAX_UPLOAD_BYTES` for multipart boundaries and part
/// headers, so the size check in the handler stays authoritative.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn uploads_routes() -> Router<AppState> {
    // Axum caps request bodies at 2 MB by default, below the configured
    // upload limit; lift it here so the handler sees the whole file.
    let body_limit = Config::get().max_upload_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/{kind}", post(upload))
        .route_layer(from_fn(allow_authenticated))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Accepted document kinds; each maps to a storage subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Consultation,
    Sptjm,
    Cv,
    Acceptance,
}

impl UploadKind {
    fn subdirectory(self) -> &'static str {
        match self {
            UploadKind::Consultation => "consultation",
            UploadKind::Sptjm => "sptjm",
            UploadKind::Cv => "cv",
            UploadKind::Acceptance => "acceptance",
        }
    }
}

impl FromStr for UploadKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consultation" => Ok(UploadKind::Consultation),
            "sptjm" => Ok(UploadKind::Sptjm),
            "cv" => Ok(UploadKind::Cv),
            "acceptance" => Ok(UploadKind::Acceptance),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedDocument {
    pub path: String,
    pub filename: String,
    pub size_bytes: usize,
}

/// POST /api/uploads/{kind}
///
/// Multipart form with a single `file` field. PDF only, capped by
/// `MAX_UPLOAD_BYTES`.
async fn upload(
    State(_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let kind = match kind.parse::<UploadKind>() {
        Ok(kind) => kind,
        Err(()) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Unknown upload kind")),
            )
                .into_response();
        }
    };

    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return (err.status(), Json(ApiResponse::error(err.body_text())))
                    .into_response();
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        if file_bytes.is_some() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "Only one file may be uploaded per request",
                )),
            )
                .into_response();
        }
        file_name = field.file_name().map(|s| s.to_string());
        match field.bytes().await {
            Ok(bytes) => file_bytes = Some(bytes.to_vec()),
            Err(err) => {
                return (err.status(), Json(ApiResponse::error(err.body_text())))
                    .into_response();
            }
        }
    }

    let file_name = match file_name {
        Some(name) => name,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Missing file upload")),
            )
                .into_response();
        }
    };

    let file_bytes = match file_bytes {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Empty file provided")),
            )
                .into_response();
        }
    };

    let config = Config::get();
    if file_bytes.len() as u64 > config.max_upload_bytes {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("File exceeds the upload size limit")),
        )
            .into_response();
    }

    // Extension and magic-number check; content type headers are not trusted.
    let is_pdf_name = file_name.to_lowercase().ends_with(".pdf");
    if !is_pdf_name || !file_bytes.starts_with(PDF_MAGIC) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Only PDF documents are accepted")),
        )
            .into_response();
    }

    let stored_name = format!(
        "{}_{}_{}",
        user.0.sub,
        Utc::now().timestamp_millis(),
        sanitize_filename(&file_name)
    );
    let relative_path = PathBuf::from(kind.subdirectory()).join(&stored_name);
    let absolute_path = PathBuf::from(&config.storage_root).join(&relative_path);

    if let Some(parent) = absolute_path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            tracing::error!(error = %err, "failed to create upload directory");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal server error")),
            )
                .into_response();
        }
    }

    if let Err(err) = tokio::fs::write(&absolute_path, &file_bytes).await {
        tracing::error!(error = %err, path = %absolute_path.display(), "failed to write upload");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Internal server error")),
        )
            .into_response();
    }

    let document = UploadedDocument {
        path: relative_path.to_string_lossy().into_owned(),
        filename: file_name,
        size_bytes: file_bytes.len(),
    };

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(document, "File uploaded")),
    )
        .into_response()
}

/// Keeps alphanumerics, dots, dashes and underscores; anything else becomes
/// an underscore. Prevents path traversal through the client filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_kind_parses_known_values() {
        assert_eq!("cv".parse::<UploadKind>(), Ok(UploadKind::Cv));
        assert_eq!(
            "acceptance".parse::<UploadKind>(),
            Ok(UploadKind::Acceptance)
        );
        assert!("resume".parse::<UploadKind>().is_err());
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("offer letter.pdf"), "offer_letter.pdf");
    }
}
