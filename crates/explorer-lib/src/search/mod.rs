//! Component search over an indexed snapshot
//!
//! Provides:
//! - The closed component catalog and per-resource presence checks
//! - Include/exclude search producing ordered match records
//! - The memory request/limit imbalance heuristic reported with each match

pub mod components;
pub mod memory;
pub mod selector;

pub use components::{component_present, ComponentCheck, ComponentDescriptor, ComponentKey};
pub use memory::{has_memory_imbalance, parse_quantity, MEMORY_IMBALANCE_RATIO};

use crate::catalog::ResourceKind;
use crate::error::{ExplorerError, Result};
use crate::index::SnapshotIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Search semantics for the selected components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// At least one selected component is present
    #[default]
    Include,
    /// None of the selected components is present
    Exclude,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Include => "include",
            SearchMode::Exclude => "exclude",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components and kinds to scan, with the matching mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub components: Vec<ComponentKey>,
    pub kinds: Vec<ResourceKind>,
    #[serde(default)]
    pub mode: SearchMode,
}

impl SearchQuery {
    pub fn new(components: Vec<ComponentKey>, kinds: Vec<ResourceKind>, mode: SearchMode) -> Self {
        Self {
            components,
            kinds,
            mode,
        }
    }

    /// Build a query from string identifiers, rejecting unknown ones
    pub fn from_ids<S: AsRef<str>>(components: &[S], kinds: &[S], mode: SearchMode) -> Result<Self> {
        let components = components
            .iter()
            .map(|id| ComponentKey::parse(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let kinds = kinds
            .iter()
            .map(|id| ResourceKind::parse(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(components, kinds, mode))
    }

    /// Reject empty selections and drop duplicates, keeping first occurrence
    pub fn validated(&self) -> Result<(Vec<ComponentKey>, Vec<ResourceKind>)> {
        validate_selection(&self.components, &self.kinds)
    }
}

pub(crate) fn validate_selection(
    components: &[ComponentKey],
    kinds: &[ResourceKind],
) -> Result<(Vec<ComponentKey>, Vec<ResourceKind>)> {
    if components.is_empty() {
        return Err(ExplorerError::InvalidQuery(
            "at least one component must be selected".to_string(),
        ));
    }
    if kinds.is_empty() {
        return Err(ExplorerError::InvalidQuery(
            "at least one resource kind must be selected".to_string(),
        ));
    }
    Ok((dedup(components), dedup(kinds)))
}

fn dedup<T: Copy + PartialEq>(items: &[T]) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(*item);
        }
    }
    unique
}

/// One matching resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
    pub name: String,
    /// Selected components found present, in selection order; empty in exclude mode
    pub matched_components: Vec<ComponentKey>,
    pub has_memory_imbalance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub matches: Vec<MatchRecord>,
    /// Resources scanned across the selected kinds
    pub total_resources: usize,
    pub match_count: usize,
}

/// Run a component search against an index
pub fn search(query: &SearchQuery, index: &SnapshotIndex) -> Result<SearchResult> {
    let (components, kinds) = query.validated()?;
    let budgets = index.resources_of(ResourceKind::PodDisruptionBudgets);

    let mut matches = Vec::new();
    let mut total_resources = 0;

    for kind in &kinds {
        let resources = index.resources_of(*kind);
        total_resources += resources.len();

        for resource in resources {
            let present: Vec<ComponentKey> = components
                .iter()
                .copied()
                .filter(|key| component_present(*key, resource, budgets))
                .collect();

            let matched_components = match query.mode {
                SearchMode::Include if !present.is_empty() => present,
                SearchMode::Exclude if present.is_empty() => Vec::new(),
                _ => continue,
            };

            matches.push(MatchRecord {
                kind: *kind,
                namespace: resource.namespace().map(str::to_string),
                name: resource.name().to_string(),
                matched_components,
                has_memory_imbalance: has_memory_imbalance(resource),
            });
        }
    }

    debug!(
        mode = %query.mode,
        components = components.len(),
        kinds = kinds.len(),
        total_resources = total_resources,
        matches = matches.len(),
        "Component search finished"
    );

    Ok(SearchResult {
        match_count: matches.len(),
        total_resources,
        matches,
    })
}

#[cfg(test)]
mod tests;
