//! Quill API Server
//!
//! HTTP server for chapter analysis and story element storage.

use anyhow::Context;
use quill_api::{create_router, state::AppState};
use quill_core::config::{AppConfig, LoggingConfig};
use quill_core::{FileStore, MemoryStore, StoryStore};
use std::sync::Arc;

/// Crates whose logs follow `logging.level` when `RUST_LOG` is unset
const LOG_TARGETS: &[&str] = &["quill_api", "quill_core", "quill_analyzer", "tower_http"];

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(logging.filter_directives(LOG_TARGETS))
            .with_context(|| format!("invalid log level {:?}", logging.level))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Wait for Ctrl-C, then report not ready while connections drain
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    state.set_ready(false);
    tracing::info!("Shutdown signal received, draining connections");
}

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("QUILL_CONFIG") {
        Ok(path) => Ok(AppConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?
            .with_env_override()?),
        Err(_) => Ok(AppConfig::from_env()?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging)?;

    let store: Arc<dyn StoryStore> = match &config.storage.path {
        Some(path) => Arc::new(
            FileStore::open(path)
                .await
                .with_context(|| format!("failed to open store at {}", path.display()))?,
        ),
        None => Arc::new(MemoryStore::new()),
    };
    tracing::info!(store = store.name(), "Story store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, store));

    // Create router
    let app = create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Quill API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    Ok(())
}
