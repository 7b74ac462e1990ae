//! # Health Check Handler
//!
//! Simple endpoint to check if the server is running.
//! Used by load balancers and monitoring systems.

/// Liveness probe
///
/// ## Route
/// GET /ping
///
/// Sits outside the session chain: it never touches a store and always
/// answers `PONG` while the process is up.
pub async fn ping() -> &'static str {
    "PONG"
}
