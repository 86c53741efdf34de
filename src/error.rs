//! Error types for Farmix
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Every failure either surfaces straight to the caller of the failing
/// operation or is turned into a JSON error envelope of the shape
/// `{ "error": ..., "details"?: ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Upstream API key is not configured (500)
    #[error("Neynar API key not configured")]
    CredentialMissing,

    /// Upstream returned a non-success status (500)
    #[error("API Error: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level HTTP client failure (500)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Upstream payload did not match the expected shape (500)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Operation-level failure with the underlying cause as details (500)
    #[error("{message}: {details}")]
    Failed { message: String, details: String },

    /// Work was cancelled before it completed (503)
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap an upstream-class failure into an operation-level error.
    ///
    /// Validation, not-found, credential and cancellation errors pass through
    /// unchanged so their status codes survive.
    pub fn during(self, message: &str) -> Self {
        match self {
            AppError::Upstream { .. } | AppError::HttpClient(_) | AppError::Decode(_) => {
                AppError::Failed {
                    message: message.to_string(),
                    details: self.to_string(),
                }
            }
            other => other,
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::CredentialMissing => "credential_missing",
            AppError::Upstream { .. } => "upstream",
            AppError::HttpClient(_) => "http_client",
            AppError::Decode(_) => "decode",
            AppError::Failed { .. } => "failed",
            AppError::Cancelled => "cancelled",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CredentialMissing
            | AppError::Upstream { .. }
            | AppError::HttpClient(_)
            | AppError::Decode(_)
            | AppError::Failed { .. }
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Upstream detail is only exposed through `details` on `Failed`;
    /// bare transport and internal errors get a generic message.
    fn into_response(self) -> Response {
        use axum::Json;

        let status = self.status();
        let (error_message, details) = match &self {
            AppError::Validation(msg) => (msg.clone(), None),
            AppError::NotFound(msg) => (msg.clone(), None),
            AppError::Failed { message, details } => (message.clone(), Some(details.clone())),
            AppError::Upstream { .. } | AppError::HttpClient(_) | AppError::Decode(_) => (
                "Upstream request failed".to_string(),
                Some(self.to_string()),
            ),
            AppError::Internal(_) => ("Internal server error".to_string(), None),
            AppError::CredentialMissing | AppError::Cancelled | AppError::Config(_) => {
                (self.to_string(), None)
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        }

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL
            .with_label_values(&[self.kind(), "unknown"])
            .inc();

        let body = match details {
            Some(details) => serde_json::json!({
                "error": error_message,
                "details": details,
            }),
            None => serde_json::json!({
                "error": error_message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
