use crate::config::UnauthorizedMode;
use crate::db::models::UserId;
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::session;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::CACHE_CONTROL, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Where anonymous browser requests to protected routes are sent
pub const LOGIN_PATH: &str = "/user/login";

/// Identity resolved for the current request
///
/// Inserted into request extensions by [`authenticate`]. Handlers read it
/// through the extractor impl; they never look at the session themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    user_id: Option<UserId>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authenticated(user_id: UserId) -> Self {
        Self { user_id: Some(user_id) }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| AppError::Internal("authentication context missing".to_string()))
    }
}

/// Decide who the session belongs to
///
/// A user id in the session is re-checked against the store every time. If
/// the account is gone the id is removed from the session and the request
/// continues as anonymous. Store errors are returned as is.
pub async fn resolve_identity(users: &dyn UserStore, session: &Session) -> AppResult<AuthContext> {
    let Some(user_id) = session::authenticated_user(session).await? else {
        return Ok(AuthContext::anonymous());
    };

    if users.exists(user_id).await? {
        return Ok(AuthContext::authenticated(user_id));
    }

    tracing::warn!(%user_id, "session references a user that no longer exists; clearing it");
    session::clear_authenticated_user(session).await?;
    Ok(AuthContext::anonymous())
}

pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = resolve_identity(state.users.as_ref(), &session).await?;
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Gate for privileged routes
///
/// Only inspects the context attached by [`authenticate`]; a missing context
/// counts as anonymous.
pub async fn require_authentication(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let context = request
        .extensions()
        .get::<AuthContext>()
        .copied()
        .unwrap_or_default();

    if !context.is_authenticated() {
        tracing::debug!(path = %request.uri().path(), "rejecting anonymous request to protected route");
        return match state.config.unauthorized_mode {
            UnauthorizedMode::Redirect => Redirect::to(LOGIN_PATH).into_response(),
            UnauthorizedMode::Status => {
                AppError::Unauthorized("Not authenticated".to_string()).into_response()
            }
        };
    }

    // Pages behind the gate must not be cached by the browser or proxies
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
