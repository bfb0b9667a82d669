//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{ApiError, ErrorResponse};
use crate::services::upload::UploadError;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Failure while receiving or storing the uploaded files
    Upload(UploadError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Upload(UploadError::ExtensionRejected { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn api_error(&self) -> ApiError {
        match self {
            AppError::Upload(err @ UploadError::ExtensionRejected { .. }) => {
                ApiError::new(err.to_string())
            }
            AppError::Upload(UploadError::Storage(e)) => {
                ApiError::new(format!("Unknown uploading error: {}", e))
            }
            AppError::Upload(err) => ApiError::new(format!("Upload error: {}", err)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse::from(self.api_error());
        (status, Json(body)).into_response()
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_rejection_is_413() {
        let err = AppError::from(UploadError::ExtensionRejected {
            file_name: "notes.txt".into(),
        });
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.api_error().message, "Only .json allowed!");
    }

    #[test]
    fn test_limit_errors_are_500_upload_errors() {
        let err = AppError::from(UploadError::TooManyFiles { max: 5 });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.api_error().message.starts_with("Upload error: "));

        let err = AppError::from(UploadError::UnexpectedField("avatar".into()));
        assert!(err.api_error().message.contains("avatar"));
    }

    #[test]
    fn test_storage_errors_are_unknown_uploading_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = AppError::from(UploadError::Storage(io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.api_error().message.starts_with("Unknown uploading error: "));
    }
}
