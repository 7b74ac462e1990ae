//! # Database Models
//!
//! Data structures that map to database rows, plus the identifier type
//! carried in sessions and request context.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a user account
///
/// This is the value stored in the session under the authenticated-user key.
/// It is only a claim: it must be checked against the users table on every
/// request before it is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User account information
///
/// `hashed_password` is never serialized, so a `User` can be handed to
/// templates as is.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// RFC3339 timestamp
    pub created: String,
}

/// A short-lived text snippet
///
/// Snippets are never returned once `expires` is in the past.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// RFC3339 timestamp
    pub created: String,
    /// RFC3339 timestamp
    pub expires: String,
}

/// Format a timestamp for storage
///
/// Fixed width (second precision, `Z` suffix) so that string comparison in
/// SQL matches chronological order.
pub fn timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
