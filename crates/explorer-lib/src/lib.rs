//! Core library for exploring Kubernetes cluster snapshots
//!
//! This crate provides:
//! - Snapshot indexing of arbitrarily nested raw payloads
//! - Per-kind counts and section summaries
//! - Structural filtering and status classification
//! - Component presence search and usage reports
//! - Snapshot loading, caching, health checks and observability

pub mod cache;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod health;
pub mod index;
pub mod loader;
pub mod models;
pub mod observability;
pub mod report;
pub mod reports;
pub mod search;
pub mod summary;
pub mod tree;

pub use cache::{CacheKey, Clock, ManualClock, SnapshotCache, SystemClock};
pub use catalog::{ResourceKind, Section};
pub use error::{ExplorerError, Result};
pub use filter::{classify_status, filter, FilterPredicate};
pub use health::{
    Component, ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse,
    ReadinessResponse,
};
pub use index::{index_snapshot, SnapshotIndex, SnapshotMeta};
pub use loader::load_snapshot_file;
pub use models::{ObjectMeta, Resource};
pub use observability::{ExplorerMetrics, StructuredLogger};
pub use report::{aggregate, ComponentReport, ReportCell, ReportRow};
pub use reports::{BestPracticesReport, Grade, NodePodsReport};
pub use search::{search, ComponentKey, MatchRecord, SearchMode, SearchQuery, SearchResult};
pub use summary::{
    summarize_counts, summarize_sections, CountSummarizer, DemoCounts, EmptyCountsFallback,
    NoFallback, ResourceCounts,
};
