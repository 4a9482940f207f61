//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::ApiResponse;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Build a validation error from a single field failure
    pub fn validation_field(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), message.to_string());
        AppError::Validation(errors)
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidOperation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side failures get logged in full and surfaced generically
        let (message, data) = match &self {
            AppError::Validation(errors) => (
                "Validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                ("An unexpected error occurred".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ApiResponse::<serde_json::Value> {
            success: false,
            message: Some(message),
            data,
        };

        (status, Json(body)).into_response()
    }
}
