//! # cookbook-server
//!
//! HTTP backend for the Cookbook recipe-sharing app.
//!
//! This binary provides:
//! - **Accounts**: registration with Argon2id password hashing, and login
//! - **Recipes**: create (JSON or multipart with a photo), list, search and
//!   delete with ownership/permission checks
//! - **Likes**: one like per (user, recipe), plus the liked-recipes list
//! - **Photo hosting**: uploaded photos served statically under `/uploads`

mod api;
mod config;
mod error;
mod photo_store;
mod schema;
mod service;

use std::sync::Arc;

use anyhow::Context;
use cookbook_store::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::photo_store::PhotoStore;
use crate::service::RecipeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,cookbook_server=debug,cookbook_store=debug")
        }))
        .init();

    info!("Starting Cookbook server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Database: migrate once here, then one connection per request
    let db_path = config.database_path.clone();
    let busy_timeout = config.busy_timeout;
    let store = tokio::task::spawn_blocking(move || Store::open(&db_path, busy_timeout))
        .await?
        .with_context(|| format!("failed to open database {}", config.database_path.display()))?;

    // Photo store (creates directory if missing)
    let photos = PhotoStore::new(config.upload_dir.clone(), config.max_photo_size)
        .await
        .context("failed to prepare upload directory")?;

    let http_addr = config.http_addr;
    let app_state = AppState {
        service: RecipeService::new(store),
        photos: Arc::new(photos),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
