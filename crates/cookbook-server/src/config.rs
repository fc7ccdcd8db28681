//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use cookbook_shared::constants::{DEFAULT_HTTP_PORT, MAX_PHOTO_SIZE};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// SQLite database file.  Parent directories are created on startup.
    /// Env: `DATABASE_PATH`
    /// Default: `./cookbook.db`
    pub database_path: PathBuf,

    /// Directory where uploaded recipe photos are written and served from.
    /// Env: `UPLOAD_DIR`
    /// Default: `./uploads`
    pub upload_dir: PathBuf,

    /// Maximum photo size in bytes.
    /// Env: `MAX_PHOTO_SIZE`
    /// Default: 10 MiB
    pub max_photo_size: usize,

    /// How long a request waits on a locked database before failing.
    /// Env: `SQLITE_BUSY_TIMEOUT_MS`
    /// Default: `5000`
    pub busy_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: PathBuf::from("./cookbook.db"),
            upload_dir: PathBuf::from("./uploads"),
            max_photo_size: MAX_PHOTO_SIZE,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(path);
        }

        if let Some(val) = lookup("MAX_PHOTO_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_photo_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_PHOTO_SIZE, using default"),
            }
        }

        if let Some(val) = lookup("SQLITE_BUSY_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.busy_timeout = Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid SQLITE_BUSY_TIMEOUT_MS, using default")
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
