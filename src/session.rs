//! # Session State
//!
//! Sessions are attached by `tower-sessions`: the manager layer resolves the
//! cookie to a server-side record on first access, creates an anonymous
//! session when there is none (or it has expired), and writes the record back
//! after the handler has returned. Nothing is persisted incrementally, so a
//! request that is cancelled mid-flight leaves the stored session untouched.
//!
//! This module owns the reserved keys and the privilege transitions:
//! - login: rotate the session id, record the user, regenerate the CSRF token
//! - logout: forget the user, rotate the session id, regenerate the CSRF token
//!
//! Concurrent requests carrying the same cookie are not serialized; whichever
//! finishes last wins.

use crate::config::Config;
use crate::db::models::UserId;
use crate::error::AppResult;
use crate::middleware::csrf;
use time::Duration;
use tower_sessions::{cookie::SameSite, Expiry, Session, SessionManagerLayer, SessionStore};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE_NAME: &str = "snippetbox_session";

/// Reserved key: id of the authenticated user, absent for anonymous sessions
pub const AUTHENTICATED_USER_KEY: &str = "authenticated_user_id";

/// Reserved key: the session's anti-forgery token
pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// One-shot message shown on the next rendered page
pub const FLASH_KEY: &str = "flash";

/// Build the session attachment layer
///
/// The cookie is HTTP-only (never readable by page script) and SameSite=Lax.
pub fn session_layer<Store>(store: Store, config: &Config) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(config.session_lifetime_hours)))
}

/// The user id the session claims, if any
pub async fn authenticated_user(session: &Session) -> AppResult<Option<UserId>> {
    Ok(session.get::<UserId>(AUTHENTICATED_USER_KEY).await?)
}

/// Drop a user id that no longer resolves to an account
pub async fn clear_authenticated_user(session: &Session) -> AppResult<()> {
    session.remove::<UserId>(AUTHENTICATED_USER_KEY).await?;
    Ok(())
}

/// Upgrade the session after a successful credential check
pub async fn login(session: &Session, user_id: UserId) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(AUTHENTICATED_USER_KEY, user_id).await?;
    csrf::rotate_token(session).await?;
    tracing::info!(%user_id, "user logged in");
    Ok(())
}

/// Return the session to anonymous
///
/// Returns `false` when the session was already anonymous, in which case
/// nothing is changed.
pub async fn logout(session: &Session) -> AppResult<bool> {
    let Some(user_id) = session.remove::<UserId>(AUTHENTICATED_USER_KEY).await? else {
        return Ok(false);
    };

    session.cycle_id().await?;
    csrf::rotate_token(session).await?;
    tracing::info!(%user_id, "user logged out");
    Ok(true)
}

pub async fn put_flash(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH_KEY, message).await?;
    Ok(())
}

pub async fn take_flash(session: &Session) -> AppResult<Option<String>> {
    Ok(session.remove::<String>(FLASH_KEY).await?)
}
