//! Error types for the upload service.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sst_renderer::RenderError;
use thiserror::Error;
use tracing::{error, warn};

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing upload field: {0}")]
    MissingInput(String),

    #[error("Duplicate upload field: {0}")]
    DuplicateInput(String),

    #[error("Upload failed: {0}")]
    Upload(#[from] MultipartError),

    #[error("No .grid file found in ZIP")]
    NoGridEntry,

    #[error("Invalid ZIP archive: {0}")]
    InvalidArchive(String),

    #[error("Invalid base image: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            ApiError::MissingInput(_)
            | ApiError::DuplicateInput(_)
            | ApiError::NoGridEntry
            | ApiError::InvalidArchive(_)
            | ApiError::InvalidImage(_) => 400,

            ApiError::Upload(e) => e.status().as_u16(),

            ApiError::Render(RenderError::MalformedGrid(_)) => 422,

            _ => 500,
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

impl From<zip::result::ZipError> for ApiError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => ApiError::Io(e),
            other => ApiError::InvalidArchive(other.to_string()),
        }
    }
}

impl From<image::ImageError> for ApiError {
    fn from(err: image::ImageError) -> Self {
        ApiError::InvalidImage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("render task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = self.to_string();

        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %message, "Rejected upload");
        } else {
            error!(status = status.as_u16(), error = %message, "Upload failed");
        }

        (status, message).into_response()
    }
}
