//! Data Transfer Objects for the HTTP API.
//!
//! The upload payloads are shared with the client and live in [`crate::api`];
//! they are re-exported here for the handlers.

pub use crate::api::{ApiError, ErrorResponse, HealthResponse, UploadResponse};

/// API version reported by the health check.
pub const API_VERSION: &str = "v1";

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: API_VERSION.to_string(),
        }
    }
}
