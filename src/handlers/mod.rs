//! # HTTP Request Handlers
//!
//! This module contains all the HTTP route handlers (controllers).
//!
//! ## Submodules
//! - `health`: Liveness endpoint
//! - `snippets`: Home page, snippet view and creation
//! - `users`: Signup, login, logout, account page
//!
//! Handlers contain no security logic. They learn who the caller is through
//! the `AuthContext` extractor and get the CSRF token for their forms through
//! `TemplateData`; the middleware in `crate::middleware` has already rejected
//! anything that should not reach them.

pub mod health;
pub mod snippets;
pub mod users;

use crate::error::AppError;

/// Fallback for unmatched routes
pub async fn not_found() -> AppError {
    AppError::NotFound("The requested resource could not be found".to_string())
}
