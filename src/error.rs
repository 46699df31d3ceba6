//! Error types for Bookshelf server

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing required input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store refused the operation or returned no identifier
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Faults that were not anticipated by the workflow (as opposed to a
    /// rejected input or a refused write)
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            AppError::Filesystem(_) | AppError::Database(_) | AppError::Internal(_)
        )
    }

    /// Message safe to show to a client. Unexpected faults are logged here and
    /// replaced by `fallback`.
    pub fn client_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Persistence(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Filesystem(e) => {
                tracing::error!("Filesystem error: {:?}", e);
                fallback.to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                fallback.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                fallback.to_string()
            }
        }
    }
}

/// Body of every JSON response that carries no record
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::Persistence(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Filesystem(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.client_message("Internal server error");
        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_classification() {
        assert!(!AppError::Validation("title".into()).is_unexpected());
        assert!(!AppError::Persistence("rejected".into()).is_unexpected());
        assert!(AppError::Internal("boom".into()).is_unexpected());
        assert!(AppError::Database(sqlx::Error::RowNotFound).is_unexpected());
    }

    #[test]
    fn test_client_message_hides_faults() {
        let err = AppError::Internal("connection reset by peer".into());
        assert_eq!(err.client_message("Something went wrong"), "Something went wrong");

        let err = AppError::Validation("title is required".into());
        assert_eq!(err.client_message("Something went wrong"), "title is required");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
