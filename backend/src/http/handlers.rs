//! HTTP handlers for the upload API.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use super::dto::{HealthResponse, UploadResponse};
use super::error::AppError;
use super::state::AppState;
use crate::services::upload::{self, UploadError};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
pub async fn health_check() -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse::ok()))
}

/// POST /upload
///
/// Accepts up to `max_files` JSON files in the `files` field and answers with
/// the concatenation of their top-level arrays. Files that do not parse are
/// skipped; any limit violation fails the whole request.
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult<UploadResponse> {
    info!("Upload request received");
    let mut multipart = multipart.map_err(|e| UploadError::Multipart(e.body_text()))?;

    let paths = upload::store_multipart_files(&mut multipart, &state.config).await?;
    info!(files = paths.len(), "Files received successfully");

    let data = upload::combine_json_lists(&paths).await;
    upload::remove_files(&paths).await;

    info!(records = data.len(), "Uploaded files combined");
    Ok(Json(UploadResponse::success(data)))
}
