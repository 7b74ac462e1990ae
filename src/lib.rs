//! # Snippetbox
//!
//! A small multi-user service for publishing short-lived text snippets.
//!
//! ## Key Concepts
//! - **Sessions**: server-side state behind an HTTP-only cookie (`tower-sessions`)
//! - **Authentication**: every dynamic request re-resolves the session's user
//!   against the user store (`middleware::auth`)
//! - **CSRF**: per-session synchronizer token checked on every unsafe request
//!   (`middleware::csrf`)
//! - **Authorization**: privileged routes sit behind a gate that only looks at
//!   the resolved identity
//!
//! `routes::router` assembles these into the open and protected chains.

pub mod config; // Configuration management (environment variables, settings)
pub mod db; // Durable stores (users, snippets)
pub mod error; // Error handling and custom error types
pub mod forms; // Form input and validation
pub mod handlers; // HTTP request handlers (routes)
pub mod middleware; // Request/response interceptors (auth, CSRF, headers, recovery)
pub mod routes; // Middleware chains and route table
pub mod session; // Session keys and login/logout transitions
pub mod state; // Shared application state
pub mod views; // HTML templates

pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::router;
pub use state::AppState;
