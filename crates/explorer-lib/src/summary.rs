//! Per-kind resource counts for dashboard menus
//!
//! Counting itself is total and deterministic. Substituting demonstration
//! data for an all-zero result is a separate, injectable strategy so that
//! production callers and tests can leave it off.

use crate::catalog::{ResourceKind, Section};
use crate::index::SnapshotIndex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Resource count per kind; every catalog kind is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResourceCounts(BTreeMap<ResourceKind, usize>);

impl ResourceCounts {
    pub fn get(&self, kind: ResourceKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: ResourceKind, count: usize) {
        self.0.insert(kind, count);
    }

    pub fn all_zero(&self) -> bool {
        self.0.values().all(|c| *c == 0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, usize)> + '_ {
        self.0.iter().map(|(k, c)| (*k, *c))
    }
}

impl FromIterator<(ResourceKind, usize)> for ResourceCounts {
    /// Counts for the given kinds; kinds not listed count zero
    fn from_iter<I: IntoIterator<Item = (ResourceKind, usize)>>(iter: I) -> Self {
        let mut counts: BTreeMap<_, _> = ResourceKind::all().map(|kind| (kind, 0)).collect();
        counts.extend(iter);
        ResourceCounts(counts)
    }
}

/// Count per kind: list length if populated, else the pre-aggregated count, else zero
pub fn summarize_counts(index: &SnapshotIndex) -> ResourceCounts {
    let counts = ResourceKind::all()
        .map(|kind| {
            let listed = index.resources_of(kind).len();
            let count = if listed > 0 {
                listed
            } else {
                index.summary_count(kind).unwrap_or(0)
            };
            (kind, count)
        })
        .collect();

    ResourceCounts(counts)
}

/// Strategy applied when every computed count is zero
pub trait EmptyCountsFallback: Send + Sync {
    /// Replace or augment the all-zero counts
    fn apply(&self, counts: &mut ResourceCounts);
}

/// Leaves all-zero counts untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl EmptyCountsFallback for NoFallback {
    fn apply(&self, _counts: &mut ResourceCounts) {}
}

/// Development-mode demonstration counts (midpoints of plausible ranges)
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCounts;

impl DemoCounts {
    fn range(kind: ResourceKind) -> (usize, usize) {
        use ResourceKind::*;
        match kind {
            Nodes => (3, 8),
            Namespaces => (10, 25),
            Events => (50, 200),
            Pods => (30, 100),
            Deployments => (10, 30),
            StatefulSets => (0, 5),
            DaemonSets => (1, 10),
            Jobs => (0, 10),
            ReplicaSets => (10, 40),
            HorizontalPodAutoscalers => (0, 8),
            PodDisruptionBudgets => (0, 5),
            Services => (10, 30),
            Ingresses => (0, 10),
            NetworkPolicies => (0, 8),
            PersistentVolumes => (0, 15),
            PersistentVolumeClaims => (0, 20),
            StorageClasses => (1, 5),
            ConfigMaps => (10, 40),
            Roles | RoleBindings => (10, 30),
            ClusterRoles | ClusterRoleBindings => (5, 20),
            Rollouts => (0, 5),
            CsiNodes => (0, 8),
        }
    }
}

impl EmptyCountsFallback for DemoCounts {
    fn apply(&self, counts: &mut ResourceCounts) {
        warn!("All resource counts are zero, substituting demonstration counts");
        for kind in ResourceKind::all() {
            let (min, max) = Self::range(kind);
            counts.set(kind, (min + max) / 2);
        }
    }
}

/// Count summarizer with an injectable all-zero fallback
pub struct CountSummarizer {
    fallback: Box<dyn EmptyCountsFallback>,
}

impl Default for CountSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountSummarizer {
    /// Summarizer that never substitutes data
    pub fn new() -> Self {
        Self {
            fallback: Box::new(NoFallback),
        }
    }

    pub fn with_fallback(fallback: impl EmptyCountsFallback + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
        }
    }

    pub fn summarize(&self, index: &SnapshotIndex) -> ResourceCounts {
        let mut counts = summarize_counts(index);
        if counts.all_zero() {
            self.fallback.apply(&mut counts);
        }
        counts
    }
}

/// Counts grouped by browsing section
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub section: Section,
    pub title: &'static str,
    pub total: usize,
    pub kinds: Vec<KindCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindCount {
    pub kind: ResourceKind,
    pub label: &'static str,
    pub count: usize,
}

/// Group counts by section in menu order
pub fn summarize_sections(counts: &ResourceCounts) -> Vec<SectionSummary> {
    Section::ALL
        .iter()
        .map(|section| {
            let kinds: Vec<KindCount> = section
                .kinds()
                .map(|kind| KindCount {
                    kind,
                    label: kind.label(),
                    count: counts.get(kind),
                })
                .collect();
            SectionSummary {
                section: *section,
                title: section.title(),
                total: kinds.iter().map(|k| k.count).sum(),
                kinds,
            }
        })
        .collect()
}
