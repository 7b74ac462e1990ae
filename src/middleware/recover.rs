use crate::error::AppError;
use crate::middleware::headers::apply_security_headers;
use axum::{
    http::{header::CONNECTION, HeaderValue},
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Turn a panic caught by `CatchPanicLayer` into a 500 response
///
/// The unwind skips the header guard, so the defensive headers are attached
/// here. The connection is closed after the response since the worker's
/// state is unknown.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "request handler panicked");

    let mut response = AppError::Internal(format!("panic: {}", detail)).into_response();
    let headers = response.headers_mut();
    apply_security_headers(headers);
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    response
}
