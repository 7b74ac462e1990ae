//! CSRF protection for state-changing requests.
//!
//! Synchronizer-token pattern: each session holds one random token. Pages
//! embed it in a hidden `csrf_token` form field (or scripts send it in the
//! `X-CSRF-Token` header), and every unsafe request must present a value
//! equal to the one stored in its own session. The session copy is the only
//! source of truth; the token is never placed in a readable cookie.

use crate::error::{AppError, AppResult};
use crate::session::CSRF_TOKEN_KEY;
use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use subtle::ConstantTimeEq;
use tower_sessions::Session;

/// Form field carrying the token
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Header carrying the token for non-form clients
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Largest request body buffered while looking for the token (2 MiB)
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The current session's token, for embedding in rendered forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::Internal("CSRF token missing from request".to_string()))
    }
}

/// Generate a new token: 32 bytes from the OS CSPRNG, URL-safe base64 (43 chars)
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison of the stored and presented tokens
#[must_use]
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// GET, HEAD, OPTIONS and TRACE never change state and are not checked
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// The session's token, issuing one if the session has none yet
pub async fn session_token(session: &Session) -> AppResult<String> {
    match session.get::<String>(CSRF_TOKEN_KEY).await? {
        Some(token) => Ok(token),
        None => rotate_token(session).await,
    }
}

/// Replace the session's token; every previously issued value stops working
pub async fn rotate_token(session: &Session) -> AppResult<String> {
    let token = generate_token();
    session.insert(CSRF_TOKEN_KEY, &token).await?;
    Ok(token)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Token presented by the client: header first, then the form field
fn presented_token(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if let Some(value) = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }

    if !is_form(headers) {
        return None;
    }

    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
        .ok()?
        .into_iter()
        .find(|(name, _)| name == CSRF_FORM_FIELD)
        .map(|(_, value)| value)
}

/// Reject unsafe requests whose token does not match the session's
///
/// The body is buffered to read the form field and then handed on
/// unchanged. On success the live token is attached to the request as a
/// [`CsrfToken`] extension.
pub async fn verify_csrf(session: Session, request: Request, next: Next) -> Result<Response, AppError> {
    let stored = session.get::<String>(CSRF_TOKEN_KEY).await?;
    let (parts, body) = request.into_parts();

    let mut request = if is_safe_method(&parts.method) {
        Request::from_parts(parts, body)
    } else {
        let bytes = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|_| AppError::BadRequest("Request body too large".to_string()))?;

        let presented = presented_token(&parts.headers, &bytes);
        let accepted = match (stored.as_deref(), presented.as_deref()) {
            (Some(expected), Some(presented)) => tokens_match(expected, presented),
            _ => false,
        };

        if !accepted {
            tracing::warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                has_session_token = stored.is_some(),
                has_presented_token = presented.is_some(),
                "CSRF token rejected"
            );
            return Err(AppError::CsrfMismatch);
        }

        Request::from_parts(parts, Body::from(bytes))
    };

    let token = match stored {
        Some(token) => token,
        None => rotate_token(&session).await?,
    };
    request.extensions_mut().insert(CsrfToken(token));

    Ok(next.run(request).await)
}
