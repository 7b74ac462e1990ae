//! # Error Handling
//!
//! This module defines the application error type and how each failure is
//! turned into an HTTP response.
//!
//! ## Failure classes
//! - `InvalidCredentials`, `DuplicateEmail`: recovered by handlers and shown
//!   as form errors; never say which half of a login was wrong
//! - `CsrfMismatch`: client error, raised before any handler runs
//! - `Unauthorized`: raised by the authorization gate in `status` mode
//! - `Database`, `Session`, `Template`, `Internal`: server faults, logged
//!   with detail and answered with a generic message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type
///
/// The `#[from]` attributes let store, session and template errors
/// propagate with `?` and end up as a 500 response.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors (SQLx library errors)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The session store could not load or persist session state
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template lookup or rendering failed
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// JSON serialization errors (building template context)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup with an email address that already has an account
    #[error("Address is already in use")]
    DuplicateEmail,

    /// State-changing request without a matching anti-forgery token
    #[error("Invalid CSRF token")]
    CsrfMismatch,

    /// Resource not found errors (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request errors (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No authenticated identity attached to the request (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server errors (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is answered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Session(_)
            | AppError::Template(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::CsrfMismatch | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Convert AppError into an HTTP response
///
/// Server faults are logged in full and the client only sees a generic
/// message. Client errors carry their own message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Session(e) => {
                tracing::error!("Session store error: {:?}", e);
                "Session error".to_string()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {:?}", e);
                "Rendering error".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Serialization error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        // Format: { "error": "error message here" }
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
