use crate::db::models::{timestamp, Snippet};
use crate::db::SnippetStore;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteSnippetStore {
    pool: SqlitePool,
}

impl SqliteSnippetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetStore for SqliteSnippetStore {
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64> {
        let now = Utc::now();
        let expires = now + Duration::days(expires_days);

        let result = sqlx::query(
            "INSERT INTO snippets (title, content, created, expires)
             VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(content)
        .bind(timestamp(now))
        .bind(timestamp(expires))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> AppResult<Snippet> {
        let snippet = sqlx::query_as::<_, Snippet>(
            "SELECT id, title, content, created, expires FROM snippets
             WHERE expires > ? AND id = ?",
        )
        .bind(timestamp(Utc::now()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        snippet.ok_or_else(|| AppError::NotFound(format!("Snippet {} not found", id)))
    }

    async fn latest(&self) -> AppResult<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(
            "SELECT id, title, content, created, expires FROM snippets
             WHERE expires > ?
             ORDER BY id DESC
             LIMIT 10",
        )
        .bind(timestamp(Utc::now()))
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }
}
