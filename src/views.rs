//! # HTML Views
//!
//! Templates are compiled into the binary and rendered with minijinja.
//! Names ending in `.html` are auto-escaped.
//!
//! Every page gets a [`TemplateData`], which is also an extractor: it pulls
//! the resolved identity and the session's CSRF token out of the request, so
//! handlers only add their page data. A pending flash message is taken from
//! the session by [`Templates::render`], so a request that redirects instead
//! of rendering leaves it for the next page.

use crate::db::models::{Snippet, User};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthContext;
use crate::middleware::csrf::CsrfToken;
use crate::session;
use axum::{extract::FromRequestParts, http::request::Parts, response::Html};
use chrono::{DateTime, Datelike, Utc};
use minijinja::Environment;
use serde::Serialize;
use tower_sessions::Session;

const TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../ui/html/base.html")),
    ("home.html", include_str!("../ui/html/home.html")),
    ("view.html", include_str!("../ui/html/view.html")),
    ("create.html", include_str!("../ui/html/create.html")),
    ("signup.html", include_str!("../ui/html/signup.html")),
    ("login.html", include_str!("../ui/html/login.html")),
    ("account.html", include_str!("../ui/html/account.html")),
];

/// "2024-03-17T10:15:00Z" -> "17 Mar 2024 at 10:15"
fn human_date(value: String) -> String {
    match DateTime::parse_from_rfc3339(&value) {
        Ok(at) => at.with_timezone(&Utc).format("%d %b %Y at %H:%M").to_string(),
        Err(_) => value,
    }
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("human_date", human_date);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub async fn render(&self, name: &str, mut data: TemplateData) -> AppResult<Html<String>> {
        if let Some(session) = data.session.take() {
            data.flash = session::take_flash(&session).await?;
        }
        let html = self.env.get_template(name)?.render(&data)?;
        Ok(Html(html))
    }
}

/// Context shared by every page
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
    pub form: serde_json::Value,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub user: Option<User>,
    #[serde(skip)]
    session: Option<Session>,
}

impl TemplateData {
    /// Attach a form (input plus validation errors) for re-rendering
    pub fn with_form<T: Serialize>(mut self, form: &T) -> AppResult<Self> {
        self.form = serde_json::to_value(form)?;
        Ok(self)
    }
}

impl<S> FromRequestParts<S> for TemplateData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        let CsrfToken(csrf_token) = CsrfToken::from_request_parts(parts, state).await?;
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        Ok(TemplateData {
            current_year: Utc::now().year(),
            is_authenticated: auth.is_authenticated(),
            csrf_token,
            session: Some(session),
            ..Default::default()
        })
    }
}
