//! Observability infrastructure for the snapshot explorer
//!
//! Provides:
//! - Prometheus metrics (search and report latency, counters, indexed resources)
//! - Structured logging of explorer events with tracing

use crate::catalog::ResourceKind;
use crate::index::SnapshotIndex;
use crate::search::{SearchMode, SearchResult};
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge_vec,
    Histogram, IntCounter, IntCounterVec, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for search and report latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ExplorerMetricsInner> = OnceLock::new();

struct ExplorerMetricsInner {
    search_latency_seconds: Histogram,
    report_latency_seconds: Histogram,
    searches_total: IntCounterVec,
    reports_total: IntCounter,
    query_errors_total: IntCounter,
    indexed_resources: IntGaugeVec,
    snapshot_loads_total: IntCounter,
}

impl ExplorerMetricsInner {
    fn new() -> Self {
        Self {
            search_latency_seconds: register_histogram!(
                "snapshot_explorer_search_latency_seconds",
                "Time spent running component searches",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register search_latency_seconds"),

            report_latency_seconds: register_histogram!(
                "snapshot_explorer_report_latency_seconds",
                "Time spent aggregating component usage reports",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register report_latency_seconds"),

            searches_total: register_int_counter_vec!(
                "snapshot_explorer_searches_total",
                "Component searches executed, by mode",
                &["mode"]
            )
            .expect("Failed to register searches_total"),

            reports_total: register_int_counter!(
                "snapshot_explorer_reports_total",
                "Component usage reports generated"
            )
            .expect("Failed to register reports_total"),

            query_errors_total: register_int_counter!(
                "snapshot_explorer_query_errors_total",
                "Searches and reports rejected as invalid"
            )
            .expect("Failed to register query_errors_total"),

            indexed_resources: register_int_gauge_vec!(
                "snapshot_explorer_indexed_resources",
                "Resources in the active snapshot, by kind",
                &["kind"]
            )
            .expect("Failed to register indexed_resources"),

            snapshot_loads_total: register_int_counter!(
                "snapshot_explorer_snapshot_loads_total",
                "Snapshots indexed and activated"
            )
            .expect("Failed to register snapshot_loads_total"),
        }
    }
}

/// Explorer metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ExplorerMetrics {
    _private: (),
}

impl Default for ExplorerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ExplorerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ExplorerMetricsInner {
        GLOBAL_METRICS.get_or_init(ExplorerMetricsInner::new)
    }

    pub fn observe_search_latency(&self, duration_secs: f64) {
        self.inner().search_latency_seconds.observe(duration_secs);
    }

    pub fn observe_report_latency(&self, duration_secs: f64) {
        self.inner().report_latency_seconds.observe(duration_secs);
    }

    pub fn inc_searches(&self, mode: SearchMode) {
        self.inner()
            .searches_total
            .with_label_values(&[mode.as_str()])
            .inc();
    }

    pub fn inc_reports(&self) {
        self.inner().reports_total.inc();
    }

    pub fn inc_query_errors(&self) {
        self.inner().query_errors_total.inc();
    }

    /// Replace the per-kind resource gauges with the active snapshot's counts
    pub fn set_indexed_resources(&self, index: &SnapshotIndex) {
        let inner = self.inner();
        inner.snapshot_loads_total.inc();
        for kind in ResourceKind::all() {
            inner
                .indexed_resources
                .with_label_values(&[kind.as_str()])
                .set(index.resources_of(kind).len() as i64);
        }
    }
}

/// Structured logger for explorer events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log a snapshot becoming active
    pub fn log_snapshot_loaded(&self, index: &SnapshotIndex, source: &str) {
        let meta = index.meta();
        info!(
            event = "snapshot_loaded",
            service = %self.service,
            source = %source,
            cluster_id = ?meta.cluster_id,
            region = %meta.region,
            timestamp = ?meta.timestamp,
            resources = index.total_resources(),
            "Snapshot loaded"
        );
    }

    /// Log a completed component search
    pub fn log_search(&self, mode: SearchMode, result: &SearchResult, elapsed_secs: f64) {
        info!(
            event = "search_completed",
            service = %self.service,
            mode = %mode,
            total_resources = result.total_resources,
            match_count = result.match_count,
            elapsed_secs = elapsed_secs,
            "Component search completed"
        );
    }

    /// Log a generated component report
    pub fn log_report(&self, kinds: usize, components: usize, elapsed_secs: f64) {
        info!(
            event = "report_generated",
            service = %self.service,
            kinds = kinds,
            components = components,
            elapsed_secs = elapsed_secs,
            "Component report generated"
        );
    }

    /// Log a rejected search or report
    pub fn log_query_rejected(&self, reason: &str) {
        warn!(
            event = "query_rejected",
            service = %self.service,
            reason = %reason,
            "Query rejected"
        );
    }

    pub fn log_startup(&self, version: &str, port: u16) {
        info!(
            event = "server_started",
            service = %self.service,
            version = %version,
            port = port,
            "Snapshot explorer started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            service = %self.service,
            reason = %reason,
            "Snapshot explorer shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_snapshot;
    use serde_json::json;

    #[test]
    fn test_explorer_metrics_creation() {
        let metrics = ExplorerMetrics::new();
        let index = index_snapshot(&json!({"data": {"podList": [{}]}}));

        metrics.observe_search_latency(0.001);
        metrics.observe_report_latency(0.002);
        metrics.inc_searches(SearchMode::Include);
        metrics.inc_searches(SearchMode::Exclude);
        metrics.inc_reports();
        metrics.inc_query_errors();
        metrics.set_indexed_resources(&index);

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "snapshot_explorer_indexed_resources"));

        let reports = families
            .iter()
            .find(|f| f.get_name() == "snapshot_explorer_report_latency_seconds")
            .expect("report latency histogram registered");
        assert!(reports.get_metric()[0].get_histogram().get_sample_count() >= 1);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("explorer-server");
        assert_eq!(logger.service, "explorer-server");
    }
}
