//! # Configuration Management
//!
//! This module handles loading configuration from environment variables.
//! It uses the "12-factor app" methodology where configuration comes from the environment.
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 4000)
//! - `DATABASE_URL`: SQLite database connection string
//! - `SESSION_LIFETIME_HOURS`: Inactivity window before a session expires (default: 12)
//! - `SECURE_COOKIES`: Add the `Secure` flag to the session cookie (default: false)
//! - `UNAUTHORIZED_MODE`: `redirect` (browser flow) or `status` (401 for programmatic clients)
//! - `STATIC_DIR`: Directory served under `/static`

use anyhow::{bail, Result};
use std::env;
use std::str::FromStr;

/// How the authorization gate answers a request that carries no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedMode {
    /// 303 See Other to the login page
    #[default]
    Redirect,
    /// 401 Unauthorized with a JSON error body
    Status,
}

impl FromStr for UnauthorizedMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redirect" => Ok(UnauthorizedMode::Redirect),
            "status" | "401" => Ok(UnauthorizedMode::Status),
            other => bail!("invalid UNAUTHORIZED_MODE '{}': expected 'redirect' or 'status'", other),
        }
    }
}

/// Application configuration
///
/// This struct holds all configuration values needed to run the server.
/// All fields are public for easy access from other modules.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    /// Examples: "127.0.0.1" (localhost only), "0.0.0.0" (all interfaces)
    pub host: String,

    /// Server port number (1-65535)
    pub port: u16,

    /// SQLite database connection URL
    /// Format: "sqlite:filename.db?mode=rwc"
    /// The "mode=rwc" means: read, write, create if not exists
    pub database_url: String,

    /// Sessions expire after this many hours without a request
    pub session_lifetime_hours: i64,

    /// Only send the session cookie over HTTPS
    /// Must be true in production; false is convenient for local HTTP
    pub secure_cookies: bool,

    /// Response used by the authorization gate for anonymous callers
    pub unauthorized_mode: UnauthorizedMode,

    /// Directory of static assets (CSS, images)
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 4000,
            database_url: "sqlite:snippetbox.db?mode=rwc".to_string(),
            session_lifetime_hours: 12,
            secure_cookies: false,
            unauthorized_mode: UnauthorizedMode::Redirect,
            static_dir: "ui/static".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads variables from .env file (if present) using dotenvy
    /// 2. Reads each configuration value from environment
    /// 3. Falls back to the defaults from `Config::default()` if variables aren't set
    /// 4. Returns an error if a value is present but cannot be parsed
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=4000
    /// DATABASE_URL=sqlite:snippetbox.db?mode=rwc
    /// SESSION_LIFETIME_HOURS=12
    /// SECURE_COOKIES=false
    /// UNAUTHORIZED_MODE=redirect
    /// ```
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (dotenvy doesn't error if file missing)
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let session_lifetime_hours = match env::var("SESSION_LIFETIME_HOURS") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.session_lifetime_hours,
        };
        if session_lifetime_hours <= 0 {
            bail!("SESSION_LIFETIME_HOURS must be positive");
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or(defaults.host),

            // Parse string to u16, return error if invalid
            port: match env::var("PORT") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.port,
            },

            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),

            session_lifetime_hours,

            secure_cookies: match env::var("SECURE_COOKIES") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.secure_cookies,
            },

            unauthorized_mode: match env::var("UNAUTHORIZED_MODE") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.unauthorized_mode,
            },

            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        })
    }

    /// Get the socket address to bind the server to
    ///
    /// Combines host and port into a format suitable for TCP binding.
    /// Example: "127.0.0.1:4000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
