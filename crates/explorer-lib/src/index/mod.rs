//! Snapshot indexing
//!
//! Normalizes an arbitrarily shaped raw snapshot payload into an ordered
//! resource list per kind. Indexing never fails: missing or malformed
//! sections become empty lists with a zero count.

use crate::catalog::ResourceKind;
use crate::models::Resource;
use crate::tree;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// Region assumed when a payload does not name one
pub const DEFAULT_REGION: &str = "US";

/// Capture timestamp prefix of snapshot file names (`<RFC3339>-snapshot.json.gz`)
static FILENAME_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)-snapshot").expect("valid filename regex"));

/// Identity and capture time of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotMeta {
    pub cluster_id: Option<String>,
    pub region: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub filename: Option<String>,
}

impl SnapshotMeta {
    fn from_payload(raw: &Value) -> Self {
        let cluster_id = tree::non_empty_str(raw.get("cluster_id"))
            .or_else(|| tree::non_empty_str(raw.get("clusterId")))
            .map(str::to_string);
        let region = tree::non_empty_str(raw.get("region"))
            .unwrap_or(DEFAULT_REGION)
            .to_string();
        let filename = tree::non_empty_str(raw.get("snapshotFilename")).map(str::to_string);

        let timestamp = tree::non_empty_str(raw.get("timestamp"))
            .and_then(parse_timestamp)
            .or_else(|| filename.as_deref().and_then(timestamp_from_filename));

        Self {
            cluster_id,
            region,
            timestamp,
            filename,
        }
    }
}

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn timestamp_from_filename(filename: &str) -> Option<DateTime<Utc>> {
    let captures = FILENAME_TIMESTAMP.captures(filename)?;
    parse_timestamp(captures.get(1)?.as_str())
}

/// Per-kind resource lists derived from one snapshot payload
///
/// Read-only after construction; safe to share across concurrent
/// searches behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotIndex {
    meta: SnapshotMeta,
    resources: BTreeMap<ResourceKind, Vec<Resource>>,
    /// Pre-aggregated counts from a `resource_summary` section
    summary_counts: BTreeMap<ResourceKind, usize>,
}

impl SnapshotIndex {
    /// Build an index directly from resource lists
    pub fn from_resources(
        meta: SnapshotMeta,
        resources: impl IntoIterator<Item = (ResourceKind, Vec<Resource>)>,
    ) -> Self {
        Self {
            meta,
            resources: resources
                .into_iter()
                .filter(|(_, list)| !list.is_empty())
                .collect(),
            summary_counts: BTreeMap::new(),
        }
    }

    pub fn meta(&self) -> &SnapshotMeta {
        &self.meta
    }

    /// Resources of one kind in payload order, empty if absent
    pub fn resources_of(&self, kind: ResourceKind) -> &[Resource] {
        self.resources
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pre-aggregated count for a kind, if the payload carried one
    pub fn summary_count(&self, kind: ResourceKind) -> Option<usize> {
        self.summary_counts.get(&kind).copied()
    }

    /// True when no kind has either resources or a pre-aggregated count
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.summary_counts.values().all(|c| *c == 0)
    }

    pub fn total_resources(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    /// Namespace names from the namespace list, in payload order
    pub fn namespace_names(&self) -> Vec<String> {
        self.resources_of(ResourceKind::Namespaces)
            .iter()
            .map(|ns| ns.name().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Find a resource by kind, namespace and name
    pub fn find(&self, kind: ResourceKind, namespace: Option<&str>, name: &str) -> Option<&Resource> {
        self.resources_of(kind)
            .iter()
            .find(|r| r.name() == name && r.namespace() == namespace)
    }
}

/// Normalize a raw snapshot payload into a [`SnapshotIndex`]
///
/// Lists are read from the `data` section under each kind's raw key.
/// A raw key may hold a bare array, an `{items: [...]}` envelope, or an
/// object that contains an `items` array at any depth. Counts from a
/// `resource_summary` section are kept alongside. The payload is not
/// modified.
pub fn index_snapshot(raw: &Value) -> SnapshotIndex {
    let meta = SnapshotMeta::from_payload(raw);
    let data = data_section(raw);

    let mut resources = BTreeMap::new();
    if let Some(data) = data {
        for kind in ResourceKind::all() {
            let list = extract_list(data.get(kind.raw_key()));
            if list.is_empty() {
                continue;
            }
            debug!(kind = %kind, count = list.len(), "Indexed resources");
            let parsed = list
                .iter()
                .map(|body| Resource::from_value(kind, body.clone()))
                .collect();
            resources.insert(kind, parsed);
        }
    }

    let summary_counts = summary_section(raw);

    SnapshotIndex {
        meta,
        resources,
        summary_counts,
    }
}

/// The mapping holding per-kind raw keys
fn data_section(raw: &Value) -> Option<&Value> {
    if let Some(data) = raw.get("data").filter(|d| d.is_object()) {
        return Some(data);
    }

    // Payloads without a `data` wrapper may carry the raw keys at the top level
    let has_raw_keys = ResourceKind::all().any(|kind| raw.get(kind.raw_key()).is_some());
    (raw.get("resource_summary").is_none() && has_raw_keys).then_some(raw)
}

fn extract_list(section: Option<&Value>) -> &[Value] {
    match section {
        Some(Value::Array(items)) => items,
        Some(section) if section.is_object() => match section.get("items") {
            Some(Value::Array(items)) => items,
            _ => tree::find_items(section).map(Vec::as_slice).unwrap_or(&[]),
        },
        _ => &[],
    }
}

fn summary_section(raw: &Value) -> BTreeMap<ResourceKind, usize> {
    let Some(Value::Object(summary)) = raw.get("resource_summary") else {
        return BTreeMap::new();
    };

    summary
        .iter()
        .filter_map(|(key, value)| {
            let kind = ResourceKind::parse(&key.to_lowercase()).ok()?;
            let count = value
                .as_u64()
                .or_else(|| value.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .unwrap_or(0);
            Some((kind, count as usize))
        })
        .collect()
}
