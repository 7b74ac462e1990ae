//! # Database Module
//!
//! The durable stores the request pipeline and handlers talk to:
//! - `UserStore`: account creation, credential verification, existence checks
//! - `SnippetStore`: snippet creation and lookup
//!
//! Both are traits so that the rest of the application only ever holds an
//! `Arc<dyn ...>`; the SQLite implementations live in `users` and `snippets`.
//!
//! ## Submodules
//! - `models`: Row types and the `UserId` identifier
//! - `users`: SQLite-backed `UserStore`
//! - `snippets`: SQLite-backed `SnippetStore`
//! - `password`: Argon2id hashing used by the user store

pub mod models;
pub mod password;
pub mod snippets;
pub mod users;

use crate::db::models::{Snippet, User, UserId};
use crate::error::AppResult;
use async_trait::async_trait;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::SqlitePool;

pub use snippets::SqliteSnippetStore;
pub use users::SqliteUserStore;

/// Durable user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account. Fails with `AppError::DuplicateEmail` if the email is taken.
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<UserId>;

    /// Verify an email/password pair.
    ///
    /// Returns `AppError::InvalidCredentials` for both an unknown email and a
    /// wrong password; other errors are store faults.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<UserId>;

    /// Whether an account with this id still exists
    async fn exists(&self, id: UserId) -> AppResult<bool>;

    /// Fetch an account. `AppError::NotFound` if it does not exist.
    async fn get(&self, id: UserId) -> AppResult<User>;
}

/// Durable snippet records
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Create a snippet that expires `expires_days` from now; returns its id
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64>;

    /// Fetch an unexpired snippet. `AppError::NotFound` otherwise.
    async fn get(&self, id: i64) -> AppResult<Snippet>;

    /// The ten most recent unexpired snippets, newest first
    async fn latest(&self) -> AppResult<Vec<Snippet>>;
}

/// Open the connection pool and bring the schema up to date
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePool::connect(database_url).await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Run the embedded migrations from ./migrations
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
