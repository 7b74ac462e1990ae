//! Shared harness for the integration tests.
//!
//! `TestApp` drives the real router with `tower::ServiceExt::oneshot`,
//! backed by an in-memory SQLite database and an in-memory session store.
//! It keeps the session cookie between requests like a browser would.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        request::Builder,
        HeaderMap, Request, StatusCode,
    },
    Router,
};
use regex::Regex;
use snippetbox::{
    db::{
        self,
        models::{User, UserId},
        SqliteSnippetStore, SqliteUserStore, UserStore,
    },
    session, AppError, AppResult, AppState, Config,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tower::ServiceExt;
use tower_sessions::{
    session::{Id, Record},
    session_store, MemoryStore, SessionStore,
};

pub const ALICE_NAME: &str = "Alice";
pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "pa$$word123";

/// SQLite user store that can be switched into a failing or panicking state
pub struct FlakyUsers {
    inner: SqliteUserStore,
    failing: AtomicBool,
    panicking: AtomicBool,
}

impl FlakyUsers {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make credential checks panic
    pub fn panic_on_authenticate(&self, panicking: bool) {
        self.panicking.store(panicking, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for FlakyUsers {
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<UserId> {
        self.check()?;
        self.inner.insert(name, email, password).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<UserId> {
        if self.panicking.load(Ordering::SeqCst) {
            panic!("user store blew up");
        }
        self.check()?;
        self.inner.authenticate(email, password).await
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        self.check()?;
        self.inner.exists(id).await
    }

    async fn get(&self, id: UserId) -> AppResult<User> {
        self.check()?;
        self.inner.get(id).await
    }
}

/// Session store whose backend is unreachable
#[derive(Debug, Clone, Default)]
pub struct DownStore;

#[async_trait]
impl SessionStore for DownStore {
    async fn save(&self, _record: &Record) -> session_store::Result<()> {
        Err(session_store::Error::Backend("session backend down".to_string()))
    }

    async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
        Err(session_store::Error::Backend("session backend down".to_string()))
    }

    async fn delete(&self, _id: &Id) -> session_store::Result<()> {
        Err(session_store::Error::Backend("session backend down".to_string()))
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn csrf_token(&self) -> String {
        extract_csrf_token(&self.body)
    }
}

/// Pull the hidden CSRF field out of a rendered form
pub fn extract_csrf_token(body: &str) -> String {
    let rx = Regex::new(r#"name="csrf_token" value="([^"]+)""#).unwrap();
    rx.captures(body)
        .unwrap_or_else(|| panic!("no CSRF token in body: {}", body))[1]
        .to_string()
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub users: Arc<FlakyUsers>,
    pub snippets: Arc<SqliteSnippetStore>,
    pub alice: UserId,
    cookie: Option<String>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        Self::with_session_store(config, MemoryStore::default()).await
    }

    pub async fn with_session_store<Store>(config: Config, store: Store) -> Self
    where
        Store: SessionStore + Clone,
    {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::migrate(&pool).await.unwrap();

        let users = Arc::new(FlakyUsers {
            inner: SqliteUserStore::new(pool.clone()),
            failing: AtomicBool::new(false),
            panicking: AtomicBool::new(false),
        });
        let snippets = Arc::new(SqliteSnippetStore::new(pool.clone()));

        let alice = users
            .insert(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
            .await
            .unwrap();

        let sessions = session::session_layer(store, &config);
        let state = AppState::with_stores(config, users.clone(), snippets.clone()).unwrap();

        TestApp {
            router: snippetbox::router(state, sessions),
            pool,
            users,
            snippets,
            alice,
            cookie: None,
        }
    }

    /// A second browser talking to the same server
    pub fn new_client(&self) -> Self {
        TestApp {
            router: self.router.clone(),
            pool: self.pool.clone(),
            users: self.users.clone(),
            snippets: self.snippets.clone(),
            alice: self.alice,
            cookie: None,
        }
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.clone()
    }

    pub fn set_session_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).unwrap();
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    pub async fn post_with_header_token(&mut self, uri: &str, token: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("x-csrf-token", token),
            Body::empty(),
        )
        .await
    }

    pub async fn send(&mut self, mut builder: Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let prefix = format!("{}=", session::SESSION_COOKIE_NAME);
        for value in response.headers().get_all(SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().trim();
            if let Some(id) = pair.strip_prefix(&prefix) {
                self.cookie = if id.is_empty() { None } else { Some(pair.to_string()) };
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    /// Fetch a page and return the CSRF token embedded in it
    pub async fn csrf_token(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "GET {} failed", uri);
        response.csrf_token()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let token = self.csrf_token("/user/login").await;
        self.post_form(
            "/user/login",
            &[("email", email), ("password", password), ("csrf_token", &token)],
        )
        .await
    }

    pub async fn login_as_alice(&mut self) {
        let response = self.login(ALICE_EMAIL, ALICE_PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
    }
}
