//! API client for a remote explorer server

use anyhow::{Context, Result};
use explorer_lib::{ResourceKind, SearchMode, SearchResult};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// API client for the explorer server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, detail);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn counts(&self) -> Result<BTreeMap<ResourceKind, usize>> {
        self.get("api/v1/counts", &[]).await
    }

    pub async fn list(&self, kind: ResourceKind, params: &ListParams) -> Result<ResourceListResponse> {
        self.get(&format!("api/v1/resources/{}", kind), &params.to_query())
            .await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        self.post("api/v1/resources/search", request).await
    }

    pub async fn report(&self, request: &ReportRequest) -> Result<Value> {
        self.post("api/v1/resources/report", request).await
    }
}

// API request and response types

#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub namespace: Option<String>,
    pub status: Option<String>,
    pub has_node_selector: bool,
    pub search: Option<String>,
}

impl ListParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(namespace) = &self.namespace {
            query.push(("namespace", namespace.clone()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if self.has_node_selector {
            query.push(("has_node_selector", "true".to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceListResponse {
    pub kind: ResourceKind,
    pub total: usize,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub components: Vec<String>,
    pub resource_types: Vec<String>,
    pub mode: SearchMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub components: Vec<String>,
    pub resource_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
