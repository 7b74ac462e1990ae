//! # Middleware Module
//!
//! Middleware intercepts HTTP requests and responses. Everything
//! security-related lives here so that handlers stay free of it.
//!
//! ## Our Middleware
//! - `recover`: converts panics into 500 responses (outermost)
//! - `headers`: attaches the fixed set of security headers
//! - `auth`: resolves the session's user (`authenticate`) and gates
//!   privileged routes (`require_authentication`)
//! - `csrf`: rejects state-changing requests without the session's token
//!
//! The order they run in is fixed by `routes::router`.

pub mod auth;
pub mod csrf;
pub mod headers;
pub mod recover;
