//! Wire types shared by the upload server and the upload client.
//!
//! All types derive Serialize/Deserialize so the same definitions describe
//! both sides of `POST /upload`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path of the upload endpoint.
pub const UPLOAD_PATH: &str = "/upload";

/// Multipart field name carrying the uploaded files.
pub const FILES_FIELD: &str = "files";

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Files uploaded successfully";

/// Successful upload: every file's top-level array, concatenated in upload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub data: Vec<Value>,
}

impl UploadResponse {
    pub fn success(data: Vec<Value>) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            data,
        }
    }
}

/// Error payload inside [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response: `{"error": {"message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

impl From<ApiError> for ErrorResponse {
    fn from(error: ApiError) -> Self {
        Self { error }
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
