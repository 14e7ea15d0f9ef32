//! Error handling module for the event listing backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
    pub const PERSISTENCE_FAILURE: &str = "PERSISTENCE_FAILURE";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const MALFORMED_STORE: &str = "MALFORMED_STORE";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug, PartialEq)]
pub enum AppError {
    /// Store directory or file cannot be created or opened
    StorageUnavailable(String),
    /// Writing the serialized collection failed
    Persistence(String),
    /// Resource not found
    NotFound(String),
    /// Store file exists but is not a valid event collection
    MalformedStore(String),
    /// Validation error
    Validation(String),
    /// Id already taken
    Conflict(String),
    /// Third-party service failed
    Upstream(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::StorageUnavailable(_) => codes::STORAGE_UNAVAILABLE,
            AppError::Persistence(_) => codes::PERSISTENCE_FAILURE,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::MalformedStore(_) => codes::MALFORMED_STORE,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::StorageUnavailable(msg)
            | AppError::Persistence(msg)
            | AppError::NotFound(msg)
            | AppError::MalformedStore(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Upstream(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Weather provider error: {:?}", err);
        AppError::Upstream(format!("Weather provider error: {}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart error: {:?}", err);
        // The body limit trips before the upload size check can run
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::Validation("File size exceeds the upload limit.".to_string());
        }
        AppError::BadRequest(format!("Invalid form data: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message().to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
