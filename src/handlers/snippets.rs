//! # Snippet Handlers
//!
//! Home page, snippet view and snippet creation. Creation is only routed
//! through the protected chain, so by the time `create` runs the caller is
//! authenticated and the CSRF token has been checked.

use crate::error::{AppError, AppResult};
use crate::forms::SnippetCreateForm;
use crate::session;
use crate::state::AppState;
use crate::views::TemplateData;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;

/// GET /
pub async fn home(State(state): State<AppState>, mut data: TemplateData) -> AppResult<Html<String>> {
    data.snippets = state.snippets.latest().await?;
    state.templates.render("home.html", data).await
}

/// GET /snippets/view/{id}
///
/// Anything that is not a positive integer id is a 404, same as an unknown
/// or expired snippet.
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut data: TemplateData,
) -> AppResult<Html<String>> {
    let id = match id.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(AppError::NotFound(format!("Snippet '{}' not found", id))),
    };

    data.snippet = Some(state.snippets.get(id).await?);
    state.templates.render("view.html", data).await
}

/// GET /snippets/create
pub async fn create_form(State(state): State<AppState>, data: TemplateData) -> AppResult<Html<String>> {
    let form = SnippetCreateForm {
        expires: 365,
        ..Default::default()
    };
    state.templates.render("create.html", data.with_form(&form)?).await
}

/// POST /snippets/create
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    data: TemplateData,
    Form(mut form): Form<SnippetCreateForm>,
) -> AppResult<Response> {
    form.validate();
    if !form.validator.valid() {
        let page = state.templates.render("create.html", data.with_form(&form)?).await?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await?;
    tracing::info!(snippet_id = id, "snippet created");

    session::put_flash(&session, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippets/view/{}", id)).into_response())
}
