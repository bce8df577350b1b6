//! Snapshot explorer server
//!
//! Loads an optional snapshot at startup and serves the query API,
//! health checks and Prometheus metrics.

use anyhow::Result;
use explorer_lib::{health::HealthRegistry, observability::ExplorerMetrics};
use explorer_server::{api, AppState, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Interval between stale cache sweeps
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting explorer-server");

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        snapshot_path = ?config.snapshot_path,
        demo_fallback = config.demo_fallback,
        max_upload_bytes = config.max_upload_bytes,
        "Server configured"
    );

    let metrics = ExplorerMetrics::new();
    let state = Arc::new(AppState::new(&config, HealthRegistry::new(), metrics));
    state.logger.log_startup(SERVER_VERSION, config.port);

    if let Some(path) = &config.snapshot_path {
        // A bad startup file leaves the server up and unhealthy until an upload
        let _ = state.load_startup_snapshot(path).await;
    }

    let purge_state = Arc::clone(&state);
    let purge_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            purge_state.purge_cache().await;
        }
    });

    let api_handle = tokio::spawn(api::serve(config.port, Arc::clone(&state)));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    state.logger.log_shutdown("SIGINT received");

    purge_handle.abort();
    api_handle.abort();

    Ok(())
}
