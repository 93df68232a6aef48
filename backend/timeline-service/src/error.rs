//! Error types for the timeline service.
//!
//! One crate-wide error enum, converted to JSON HTTP responses at the
//! actix boundary.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for timeline-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Lookup of a group slug, username, or post id that does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Mutation attempted by someone other than the resource owner
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Operation requires an authenticated viewer
    #[error("authentication required")]
    AuthRequired,

    /// Malformed or missing input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Requested page is beyond the last page of the sequence
    #[error("invalid page {requested}: only {total_pages} page(s) available")]
    InvalidPage { requested: u32, total_pages: u32 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::AuthRequired => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPage { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
