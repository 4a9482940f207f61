//! API layer
//!
//! Router state, the JSON response envelope, middleware, and routes.

pub mod extractors;
pub mod middleware;
pub mod routes;

use serde::Serialize;
use sqlx::PgPool;

use crate::auth::TokenService;

pub use routes::{create_protected_router, create_public_router};

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
}

/// JSON envelope wrapping every response body
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data only
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Successful response with a message and data
    pub fn with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }
    }

    /// Successful response with a message and no data
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        }
    }
}
