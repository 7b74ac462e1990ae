//! # User Handlers
//!
//! Signup, login, logout and the account page.
//!
//! ## Login
//! A failed login re-renders the form with one generic message whether the
//! email is unknown or the password is wrong. A successful login rotates the
//! session id and the CSRF token (see `session::login`) and redirects.
//!
//! ## Logout
//! Idempotent: an anonymous session is simply redirected home.

use crate::error::{AppError, AppResult};
use crate::forms::{UserLoginForm, UserSignupForm};
use crate::middleware::auth::AuthContext;
use crate::session;
use crate::state::AppState;
use crate::views::TemplateData;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;

/// GET /user/signup
pub async fn signup_form(State(state): State<AppState>, data: TemplateData) -> AppResult<Html<String>> {
    state
        .templates
        .render("signup.html", data.with_form(&UserSignupForm::default())?)
        .await
}

/// POST /user/signup
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    data: TemplateData,
    Form(mut form): Form<UserSignupForm>,
) -> AppResult<Response> {
    form.validate();

    if form.validator.valid() {
        match state.users.insert(&form.name, &form.email, &form.password).await {
            Ok(user_id) => {
                tracing::info!(%user_id, "account created");
                session::put_flash(&session, "Your signup was successful. Please log in.").await?;
                return Ok(Redirect::to("/user/login").into_response());
            }
            Err(AppError::DuplicateEmail) => {
                form.validator.add_field_error("email", "Address is already in use");
            }
            Err(e) => return Err(e),
        }
    }

    let page = state.templates.render("signup.html", data.with_form(&form)?).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

/// GET /user/login
pub async fn login_form(State(state): State<AppState>, data: TemplateData) -> AppResult<Html<String>> {
    state
        .templates
        .render("login.html", data.with_form(&UserLoginForm::default())?)
        .await
}

/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    data: TemplateData,
    Form(mut form): Form<UserLoginForm>,
) -> AppResult<Response> {
    form.validate();

    if form.validator.valid() {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(user_id) => {
                session::login(&session, user_id).await?;
                return Ok(Redirect::to("/snippets/create").into_response());
            }
            Err(AppError::InvalidCredentials) => {
                tracing::warn!("failed login attempt");
                form.validator.add_non_field_error("Email or password is incorrect");
            }
            Err(e) => return Err(e),
        }
    }

    let page = state.templates.render("login.html", data.with_form(&form)?).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

/// POST /user/logout
pub async fn logout(session: Session) -> AppResult<Redirect> {
    if session::logout(&session).await? {
        session::put_flash(&session, "You've been logged out successfully!").await?;
    }

    Ok(Redirect::to("/"))
}

/// GET /account/view
pub async fn account(
    State(state): State<AppState>,
    auth: AuthContext,
    mut data: TemplateData,
) -> AppResult<Html<String>> {
    let user_id = auth
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    data.user = Some(state.users.get(user_id).await?);
    state.templates.render("account.html", data).await
}
