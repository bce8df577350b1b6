//! Server configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration, read from `EXPLORER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the API, health and metrics
    #[serde(default = "default_port")]
    pub port: u16,

    /// Snapshot file activated at startup
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Freshness window of cached snapshots in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: i64,

    /// Substitute demonstration counts when every count is zero
    #[serde(default)]
    pub demo_fallback: bool,

    /// Largest accepted request body, in bytes (snapshot uploads)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    256 * 1024 * 1024
}

fn default_cache_ttl() -> i64 {
    explorer_lib::cache::DEFAULT_TTL_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            snapshot_path: None,
            cache_ttl_secs: default_cache_ttl(),
            demo_fallback: false,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("EXPLORER").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
