//! Snapshot cache keyed by cluster and region
//!
//! Entries are fresh for a fixed window after capture. The clock is
//! injected so freshness can be tested without real timers.

use crate::index::SnapshotIndex;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Default freshness window
pub const DEFAULT_TTL_SECS: i64 = 600;

/// Time source for freshness checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

/// Cache key: cluster id and region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub cluster_id: String,
    pub region: String,
}

impl CacheKey {
    pub fn new(cluster_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            region: region.into(),
        }
    }
}

struct CacheEntry {
    index: Arc<SnapshotIndex>,
    captured_at: DateTime<Utc>,
}

/// Concurrent snapshot cache with a freshness window
pub struct SnapshotCache<C: Clock = SystemClock> {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    clock: C,
}

impl Default for SnapshotCache<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock, Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl<C: Clock> SnapshotCache<C> {
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Fresh entry for `key` together with its capture time
    pub fn get(&self, key: &CacheKey) -> Option<(Arc<SnapshotIndex>, DateTime<Utc>)> {
        let entry = self.entries.get(key)?;
        if self.is_stale(entry.captured_at) {
            debug!(cluster_id = %key.cluster_id, region = %key.region, "Cached snapshot is stale");
            return None;
        }
        Some((Arc::clone(&entry.index), entry.captured_at))
    }

    /// Store a snapshot, superseding any previous entry for `key`
    pub fn put(&self, key: CacheKey, index: Arc<SnapshotIndex>) -> DateTime<Utc> {
        let captured_at = self.clock.now();
        debug!(cluster_id = %key.cluster_id, region = %key.region, "Caching snapshot");
        self.entries.insert(key, CacheEntry { index, captured_at });
        captured_at
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop all stale entries, returning how many were removed
    pub fn purge_stale(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_stale(entry.captured_at));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_stale(&self, captured_at: DateTime<Utc>) -> bool {
        self.clock.now() - captured_at >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_snapshot;
    use chrono::TimeZone;
    use serde_json::json;

    fn cache() -> (SnapshotCache<ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let cache = SnapshotCache::new(clock.clone(), Duration::seconds(DEFAULT_TTL_SECS));
        (cache, clock)
    }

    fn snapshot() -> Arc<SnapshotIndex> {
        Arc::new(index_snapshot(&json!({"data": {"podList": [{"metadata": {"name": "p"}}]}})))
    }

    #[test]
    fn test_fresh_entry_is_returned() {
        let (cache, clock) = cache();
        let key = CacheKey::new("c1", "US");
        let captured = cache.put(key.clone(), snapshot());

        clock.advance(Duration::minutes(9));
        let (index, at) = cache.get(&key).unwrap();
        assert_eq!(at, captured);
        assert_eq!(index.total_resources(), 1);
    }

    #[test]
    fn test_entry_expires_after_window() {
        let (cache, clock) = cache();
        let key = CacheKey::new("c1", "US");
        cache.put(key.clone(), snapshot());

        clock.advance(Duration::minutes(10));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.purge_stale(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_region_scoped() {
        let (cache, _clock) = cache();
        cache.put(CacheKey::new("c1", "US"), snapshot());

        assert!(cache.get(&CacheKey::new("c1", "EU")).is_none());
        assert!(cache.invalidate(&CacheKey::new("c1", "US")));
        assert!(!cache.invalidate(&CacheKey::new("c1", "US")));
    }

    #[test]
    fn test_put_supersedes() {
        let (cache, clock) = cache();
        let key = CacheKey::new("c1", "US");
        cache.put(key.clone(), Arc::new(SnapshotIndex::default()));
        clock.advance(Duration::minutes(8));
        cache.put(key.clone(), snapshot());
        clock.advance(Duration::minutes(8));

        let (index, _) = cache.get(&key).unwrap();
        assert_eq!(index.total_resources(), 1);
        assert_eq!(cache.len(), 1);
    }
}
