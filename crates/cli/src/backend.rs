//! Snapshot source: a local file or a remote explorer server

use crate::client::{ApiClient, ListParams, ReportRequest, SearchRequest};
use anyhow::Result;
use explorer_lib::{
    aggregate, filter, load_snapshot_file, search, summarize_counts, ComponentKey,
    FilterPredicate, Resource, ResourceCounts, ResourceKind, SearchMode, SearchQuery,
    SearchResult, SnapshotIndex,
};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub enum Backend {
    Local(SnapshotIndex),
    Remote(ApiClient),
}

impl Backend {
    pub fn local(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Using local snapshot");
        Ok(Backend::Local(load_snapshot_file(path)?))
    }

    pub fn remote(api_url: &str) -> Result<Self> {
        debug!(api_url = %api_url, "Using remote explorer server");
        Ok(Backend::Remote(ApiClient::new(api_url)?))
    }

    pub async fn counts(&self) -> Result<ResourceCounts> {
        match self {
            Backend::Local(index) => Ok(summarize_counts(index)),
            Backend::Remote(client) => Ok(client.counts().await?.into_iter().collect()),
        }
    }

    /// Resources of one kind matching the predicate, with the unfiltered total
    pub async fn list(&self, kind: ResourceKind, predicate: &FilterPredicate) -> Result<(Vec<Resource>, usize)> {
        match self {
            Backend::Local(index) => {
                let resources = index.resources_of(kind);
                let items = filter(resources, predicate).into_iter().cloned().collect();
                Ok((items, resources.len()))
            }
            Backend::Remote(client) => {
                let params = ListParams {
                    namespace: predicate.namespace.clone(),
                    status: predicate.status.clone(),
                    has_node_selector: predicate.has_node_selector,
                    search: predicate.search_term.clone(),
                };
                let response = client.list(kind, &params).await?;
                let items = response
                    .items
                    .into_iter()
                    .map(|body| Resource::from_value(kind, body))
                    .collect();
                Ok((items, response.total))
            }
        }
    }

    pub async fn search(
        &self,
        components: &[ComponentKey],
        kinds: &[ResourceKind],
        mode: SearchMode,
    ) -> Result<SearchResult> {
        match self {
            Backend::Local(index) => {
                let query = SearchQuery::new(components.to_vec(), kinds.to_vec(), mode);
                Ok(search(&query, index)?)
            }
            Backend::Remote(client) => {
                let request = SearchRequest {
                    components: ids(components),
                    resource_types: ids(kinds),
                    mode,
                };
                client.search(&request).await
            }
        }
    }

    /// Usage matrix as `{ kind: { total_resources, <component>: count } }`
    pub async fn report(&self, components: &[ComponentKey], kinds: &[ResourceKind]) -> Result<Value> {
        match self {
            Backend::Local(index) => {
                let report = aggregate(components, kinds, index)?;
                Ok(serde_json::to_value(report)?)
            }
            Backend::Remote(client) => {
                let request = ReportRequest {
                    components: ids(components),
                    resource_types: ids(kinds),
                };
                client.report(&request).await
            }
        }
    }
}

fn ids<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
