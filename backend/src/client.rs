//! Upload client for the dashboard.
//!
//! Sends local history files to `POST /upload` and returns the merged `data`
//! array for [`crate::services::Dashboard::load`].

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ErrorResponse, UploadResponse, FILES_FIELD, UPLOAD_PATH};

/// Environment variable naming the upload server.
pub const SERVER_URL_ENV: &str = "PLAYSTATS_SERVER";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to upload server failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upload server answered {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid response from upload server: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct UploadClient {
    base_url: String,
    http: reqwest::Client,
}

impl UploadClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Client for `PLAYSTATS_SERVER`, or the local default.
    pub fn from_env() -> Self {
        let base_url = std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }

    /// Upload the files as one multipart request, one `files` part each.
    pub async fn upload<P: AsRef<Path>>(&self, paths: &[P]) -> Result<UploadResponse, ClientError> {
        let mut form = Form::new();
        for path in paths {
            form = form.part(FILES_FIELD, file_part(path.as_ref()).await?);
        }

        info!(files = paths.len(), url = %self.upload_url(), "Uploading files");
        let response = self.http.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "Upload response received");

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                message: error_message(status, &body),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

async fn file_part(path: &Path) -> Result<Part, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Message from a `{"error":{"message":..}}` body, else the status text.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .map(|err| err.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}
