//! Error types for the asset service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for the asset service.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Record not found in any collaborator
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request data (bad id, bad url)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Primary document store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Secondary backend or third-party HTTP failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Backend(format!("request timed out: {}", err))
        } else {
            AppError::Backend(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Backend(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the asset service.
pub type Result<T> = std::result::Result<T, AppError>;
