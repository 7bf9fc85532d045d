//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error bodies are JSON:
//!
//! ```json
//! { "timestamp": "2025-01-01T12:00:00Z", "status": 404, "errors": ["can't find order by id: 7"] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;

/// Application-level error type for the bookstore API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Authentication operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks the role required for the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Order(err) => match err {
                OrderError::Validation(_) => StatusCode::BAD_REQUEST,
                OrderError::UserNotFound(_)
                | OrderError::CartNotFound(_)
                | OrderError::OrderNotFound(_)
                | OrderError::OrderItemNotFound { .. } => StatusCode::NOT_FOUND,
                OrderError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartError::BookNotFound(_) | CartError::ItemNotFound(_) => StatusCode::NOT_FOUND,
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::BookNotFound(_)
                | CatalogError::CategoryNotFound(_)
                | CatalogError::NoBooksInCategory(_) => StatusCode::NOT_FOUND,
                CatalogError::DuplicateIsbn(_) => StatusCode::CONFLICT,
                CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
                CatalogError::Search(_) | CatalogError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            _ if status.is_server_error() => "Internal server error".to_string(),
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Auth(AuthError::UserAlreadyExists) => {
                "An account with this email already exists".to_string()
            }
            Self::Auth(AuthError::WeakPassword(msg)) => msg.clone(),
            Self::Auth(AuthError::InvalidEmail(_)) => "Invalid email address".to_string(),
            _ => self.to_string(),
        };

        let body = json!({
            "timestamp": Utc::now(),
            "status": status.as_u16(),
            "errors": [message],
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
