//! # Route Composition
//!
//! Every request passes through the global chain:
//!
//! 1. `recover` - panics become 500 responses
//! 2. `TraceLayer` - request/response logging
//! 3. `secure_headers` - fixed security headers
//!
//! Dynamic pages then run the **open** chain:
//!
//! 4. session attach (`tower-sessions`)
//! 5. `authenticate` - resolve the session's user into an `AuthContext`
//! 6. `verify_csrf` - reject unsafe requests without the session's token
//!
//! and privileged pages additionally run the **protected** chain:
//!
//! 7. `require_authentication` - anonymous callers never reach the handler
//!
//! `ServiceBuilder` applies layers top to bottom, so each list below reads in
//! execution order.

use crate::handlers::{health, not_found, snippets, users};
use crate::middleware::{
    auth::{authenticate, require_authentication},
    csrf::verify_csrf,
    headers::secure_headers,
    recover::handle_panic,
};
use crate::state::AppState;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

/// Routes that need an authenticated user
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/snippets/create", get(snippets::create_form).post(snippets::create))
        .route("/account/view", get(users::account))
        .route_layer(from_fn_with_state(state.clone(), require_authentication))
}

/// Routes that need a session but no particular identity
fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(snippets::home))
        .route("/snippets/view/{id}", get(snippets::view))
        .route("/user/signup", get(users::signup_form).post(users::signup))
        .route("/user/login", get(users::login_form).post(users::login))
        .route("/user/logout", post(users::logout))
}

/// Build the application router
///
/// `sessions` is the session attachment layer (see `session::session_layer`);
/// any `SessionStore` works, which is how tests run against an in-memory store.
pub fn router<Store>(state: AppState, sessions: SessionManagerLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    let dynamic = open_routes().merge(protected_routes(&state)).route_layer(
        ServiceBuilder::new()
            .layer(sessions)
            .layer(from_fn_with_state(state.clone(), authenticate))
            .layer(from_fn(verify_csrf)),
    );

    Router::new()
        .route("/ping", get(health::ping))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .merge(dynamic)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(secure_headers)),
        )
        .with_state(state)
}
