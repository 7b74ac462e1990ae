use crate::db::models::{timestamp, User, UserId};
use crate::db::password::{hash_password, verify_password, DUMMY_HASH};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Run the CPU-heavy hashing off the async workers
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))?
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<UserId> {
        let password = password.to_string();
        let hashed_password = blocking(move || hash_password(&password)).await?;

        let result = sqlx::query(
            "INSERT INTO users (name, email, hashed_password, created)
             VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(&hashed_password)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateEmail,
            _ => AppError::Database(e),
        })?;

        Ok(UserId(result.last_insert_rowid()))
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<UserId> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, hashed_password FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        // Unknown emails still pay for a verification
        let (id, hashed_password) = match row {
            Some((id, hashed_password)) => (Some(id), hashed_password),
            None => (None, DUMMY_HASH.to_string()),
        };

        let password = password.to_string();
        let matches = blocking(move || verify_password(&password, &hashed_password)).await?;

        match id {
            Some(id) if matches => Ok(UserId(id)),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists != 0)
    }

    async fn get(&self, id: UserId) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, hashed_password, created FROM users WHERE id = ?",
        )
        .bind(id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound(format!("User with id '{}' not found", id)),
            _ => AppError::Database(e),
        })?;

        Ok(user)
    }
}
