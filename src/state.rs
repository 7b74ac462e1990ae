//! # Application State
//!
//! This module defines the shared state that's accessible to all request handlers.
//! In Axum, state is how you share resources (stores, templates, configuration)
//! across different parts of your application.
//!
//! The pipeline holds no mutable state of its own: everything that changes
//! lives behind the user store, the snippet store or the session store.

use crate::config::Config;
use crate::db::{SnippetStore, SqliteSnippetStore, SqliteUserStore, UserStore};
use crate::views::Templates;
use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

/// Shared application state
///
/// Cloned for every request; every field is behind an `Arc`, so a clone only
/// copies pointers.
#[derive(Clone)]
pub struct AppState {
    /// Durable user accounts (existence checks, credential verification)
    pub users: Arc<dyn UserStore>,

    /// Durable snippets
    pub snippets: Arc<dyn SnippetStore>,

    /// Compiled HTML templates
    pub templates: Arc<Templates>,

    /// Runtime configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state backed by the SQLite stores on `pool`
    ///
    /// The pool must already be migrated (see `db::connect`).
    pub fn new(config: Config, pool: SqlitePool) -> Result<Self> {
        Self::with_stores(
            config,
            Arc::new(SqliteUserStore::new(pool.clone())),
            Arc::new(SqliteSnippetStore::new(pool)),
        )
    }

    /// Build state around arbitrary store implementations
    pub fn with_stores(
        config: Config,
        users: Arc<dyn UserStore>,
        snippets: Arc<dyn SnippetStore>,
    ) -> Result<Self> {
        Ok(AppState {
            users,
            snippets,
            templates: Arc::new(Templates::new()?),
            config: Arc::new(config),
        })
    }
}
