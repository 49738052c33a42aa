//! Error handling module
//!
//! Centralized error types and HTTP response conversion. This is the only
//! place where failures are translated into status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::repository::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_string(),
                "invalid_request",
                Some(msg.clone()),
            ),

            AppError::Domain(domain_err) => match domain_err {
                // 401 Unauthorized
                DomainError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    domain_err.to_string(),
                    domain_err.error_code(),
                    None,
                ),
                DomainError::InsufficientFunds { .. } => (
                    StatusCode::BAD_REQUEST,
                    "Insufficient funds".to_string(),
                    domain_err.error_code(),
                    None,
                ),
                DomainError::InvalidAmount(msg) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid amount".to_string(),
                    domain_err.error_code(),
                    Some(msg.clone()),
                ),
            },

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!(error = ?e, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                    "internal_error",
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                    "internal_error",
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
