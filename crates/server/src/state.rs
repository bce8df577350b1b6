//! Shared application state and the active snapshot

use crate::config::ServerConfig;
use explorer_lib::{
    cache::{CacheKey, SnapshotCache, SystemClock},
    health::{Component, HealthRegistry},
    load_snapshot_file,
    observability::{ExplorerMetrics, StructuredLogger},
    summary::{CountSummarizer, DemoCounts},
    SnapshotIndex,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Cluster id used for cache keys when a payload does not carry one
const UNKNOWN_CLUSTER: &str = "unknown";

pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: ExplorerMetrics,
    pub logger: StructuredLogger,
    pub cache: SnapshotCache<SystemClock>,
    pub summarizer: CountSummarizer,
    pub max_upload_bytes: usize,
    active: RwLock<Option<Arc<SnapshotIndex>>>,
}

impl AppState {
    pub fn new(config: &ServerConfig, health_registry: HealthRegistry, metrics: ExplorerMetrics) -> Self {
        let summarizer = if config.demo_fallback {
            CountSummarizer::with_fallback(DemoCounts)
        } else {
            CountSummarizer::new()
        };

        Self {
            health_registry,
            metrics,
            logger: StructuredLogger::new("explorer-server"),
            cache: SnapshotCache::new(SystemClock, chrono::Duration::seconds(config.cache_ttl_secs)),
            summarizer,
            max_upload_bytes: config.max_upload_bytes,
            active: RwLock::new(None),
        }
    }

    /// Currently active snapshot, if any
    pub async fn active(&self) -> Option<Arc<SnapshotIndex>> {
        self.active.read().await.clone()
    }

    /// Make `index` the active snapshot, replacing the previous one
    pub async fn activate(&self, index: SnapshotIndex, source: &str) -> Arc<SnapshotIndex> {
        let index = Arc::new(index);
        self.cache.put(cache_key(&index), Arc::clone(&index));

        *self.active.write().await = Some(Arc::clone(&index));

        self.metrics.set_indexed_resources(&index);
        self.logger.log_snapshot_loaded(&index, source);
        self.health_registry.set_healthy(Component::Snapshot).await;
        self.health_registry.set_healthy(Component::Cache).await;
        self.health_registry.mark_snapshot_active();

        index
    }

    /// Activate a snapshot file; a failure marks the snapshot component unhealthy
    pub async fn load_startup_snapshot(&self, path: &Path) -> explorer_lib::Result<Arc<SnapshotIndex>> {
        match load_snapshot_file(path) {
            Ok(index) => Ok(self.activate(index, &path.display().to_string()).await),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to load startup snapshot");
                self.health_registry
                    .set_unhealthy(Component::Snapshot, err.to_string())
                    .await;
                Err(err)
            }
        }
    }

    /// Drop stale cache entries; an emptied cache reports degraded
    pub async fn purge_cache(&self) -> usize {
        let purged = self.cache.purge_stale();
        if purged > 0 {
            debug!(purged = purged, "Purged stale cached snapshots");
            if self.cache.is_empty() {
                self.health_registry
                    .set_degraded(Component::Cache, "No fresh snapshot cached")
                    .await;
            }
        }
        purged
    }
}

pub fn cache_key(index: &SnapshotIndex) -> CacheKey {
    let meta = index.meta();
    CacheKey::new(
        meta.cluster_id.as_deref().unwrap_or(UNKNOWN_CLUSTER),
        meta.region.as_str(),
    )
}
