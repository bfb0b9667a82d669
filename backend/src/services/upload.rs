//! Multipart upload handling: temporary storage and merging of JSON lists.
//!
//! Uploaded files are streamed to the configured upload directory, checked
//! against the extension, count and size limits, then parsed and concatenated.
//! Any limit violation aborts the whole request and removes the files already
//! written for it.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::Multipart;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::FILES_FIELD;
use crate::config::ServerConfig;

/// Message of the extension rejection, part of the public error contract.
pub const EXTENSION_ERROR_MESSAGE: &str = "Only .json allowed!";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only .json allowed!")]
    ExtensionRejected { file_name: String },

    #[error("Too many files (at most {max} per upload)")]
    TooManyFiles { max: usize },

    #[error("Unexpected field: {0:?}")]
    UnexpectedField(String),

    #[error("File too large: {file_name} exceeds {limit} bytes")]
    FileTooLarge { file_name: String, limit: u64 },

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    #[error("Failed to store uploaded file: {0}")]
    Storage(#[from] std::io::Error),
}

/// Case-insensitive `.json` extension check on the client-supplied file name.
pub fn is_json_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// `<field>-<unix millis>-<uuid>.json`
pub fn temp_file_name(field: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}-{}.json", field, millis, Uuid::new_v4().simple())
}

/// Stream every `files` part of the request into `config.upload_dir` and
/// return the temporary paths in upload order.
pub async fn store_multipart_files(
    multipart: &mut Multipart,
    config: &ServerConfig,
) -> Result<Vec<PathBuf>, UploadError> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let mut stored = Vec::new();
    match receive_files(multipart, config, &mut stored).await {
        Ok(()) => Ok(stored),
        Err(err) => {
            remove_files(&stored).await;
            Err(err)
        }
    }
}

async fn receive_files(
    multipart: &mut Multipart,
    config: &ServerConfig,
    stored: &mut Vec<PathBuf>,
) -> Result<(), UploadError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != FILES_FIELD {
            return Err(UploadError::UnexpectedField(field_name));
        }
        if stored.len() >= config.max_files {
            return Err(UploadError::TooManyFiles {
                max: config.max_files,
            });
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_json_file_name(&file_name) {
            return Err(UploadError::ExtensionRejected { file_name });
        }

        let path = config.upload_dir.join(temp_file_name(&field_name));
        let mut file = tokio::fs::File::create(&path).await?;
        // Tracked before writing so a failure below still cleans it up.
        stored.push(path.clone());

        let mut size = 0u64;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UploadError::Multipart(e.body_text()))?
        {
            size += chunk.len() as u64;
            if size > config.max_file_size {
                return Err(UploadError::FileTooLarge {
                    file_name,
                    limit: config.max_file_size,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(file = %file_name, path = %path.display(), size, "Stored uploaded file");
    }
    Ok(())
}

/// Parse every file as a JSON array and concatenate the contents in order.
///
/// Files that cannot be read, are not valid JSON, or whose top level is not an
/// array are skipped with a warning.
pub async fn combine_json_lists(paths: &[PathBuf]) -> Vec<Value> {
    let mut combined = Vec::new();
    for path in paths {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Error reading uploaded file");
                continue;
            }
        };
        match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(list) => combined.extend(list),
            Err(e) => warn!(file = %path.display(), error = %e, "Error processing uploaded file"),
        }
    }
    combined
}

/// Best-effort removal of temporary files.
pub async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(file = %path.display(), error = %e, "Failed to remove temporary upload");
        }
    }
}
