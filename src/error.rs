/// Unified error types for the Country Explorer API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Upstream country absent, or favorite id/name absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate favorite name
    #[error("{0}")]
    Conflict(String),

    /// Malformed favorite identifier
    #[error("{0}")]
    InvalidIdentifier(String),

    /// Request validation errors (missing fields, out-of-range query values)
    #[error("{0}")]
    Validation(String),

    /// Country API could not be reached or answered with garbage
    #[error("Country service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Media host rejected or failed an operation
    #[error("Media storage error: {0}")]
    MediaStorage(String),

    /// Request body over the configured upload limit
    #[error("Request body exceeds the upload limit")]
    PayloadTooLarge,

    /// No media host credentials configured
    #[error("Image uploads are not configured on this server")]
    MediaUnavailable,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body, shaped like `{"detail": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidIdentifier(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UpstreamUnavailable(_) | ApiError::MediaStorage(_) => StatusCode::BAD_GATEWAY,
            ApiError::MediaUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Migration(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::InvalidIdentifier(_) => "invalid_identifier",
            ApiError::Validation(_) => "validation",
            ApiError::PayloadTooLarge => "payload_too_large",
            ApiError::UpstreamUnavailable(_) => "upstream_unavailable",
            ApiError::MediaStorage(_) => "media_storage",
            ApiError::MediaUnavailable => "media_unavailable",
            ApiError::Config(_) => "config",
            ApiError::Database(_) => "database",
            ApiError::Migration(_) => "migration",
            ApiError::Io(_) => "io",
            ApiError::Internal(_) => "internal",
        }
    }
}

/// Convert ApiError to HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        crate::metrics::record_error(self.kind());

        let detail = match self {
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Migration(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed with internal error");
                "Internal server error".to_string() // Don't leak details
            }
            _ => {
                if status.is_server_error() {
                    tracing::error!(error = %self, "request failed");
                }
                self.to_string()
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// Result type alias for service operations
pub type ApiResult<T> = Result<T, ApiError>;
