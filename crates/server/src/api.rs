//! HTTP API for snapshot queries, health checks and Prometheus metrics

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use explorer_lib::{
    aggregate, cache::CacheKey, filter, index_snapshot, search, summarize_sections, ComponentKey,
    ExplorerError, FilterPredicate, Resource, ResourceKind, SearchMode, SearchQuery,
    SnapshotIndex,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Error answered as `{ "detail": ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn no_snapshot() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "No snapshot loaded")
    }
}

impl From<ExplorerError> for ApiError {
    fn from(err: ExplorerError) -> Self {
        let status = if err.is_query_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            other => other.status(),
        };
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// JSON body whose rejection is answered in the `{detail}` shape
type JsonBody<T> = Result<Json<T>, JsonRejection>;

async fn active_snapshot(state: &AppState) -> Result<Arc<SnapshotIndex>, ApiError> {
    state.active().await.ok_or_else(ApiError::no_snapshot)
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = if health.status.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once a snapshot is active
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

fn snapshot_overview(state: &AppState, index: &SnapshotIndex) -> Value {
    json!({
        "meta": index.meta(),
        "counts": state.summarizer.summarize(index),
        "namespaces": index.namespace_names(),
    })
}

async fn get_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let index = active_snapshot(&state).await?;
    Ok(Json(snapshot_overview(&state, &index)))
}

/// Index a raw payload and make it the active snapshot
async fn put_snapshot(
    State(state): State<Arc<AppState>>,
    payload: JsonBody<Value>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let index = state.activate(index_snapshot(&payload), "upload").await;
    Ok(Json(snapshot_overview(&state, &index)))
}

/// Fresh cached snapshot for a cluster and region
async fn get_cached_snapshot(
    State(state): State<Arc<AppState>>,
    Path((cluster_id, region)): Path<(String, String)>,
) -> ApiResult<Value> {
    let (index, captured_at) = state
        .cache
        .get(&CacheKey::new(cluster_id, region))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "No fresh snapshot cached"))?;

    let mut overview = snapshot_overview(&state, &index);
    overview["captured_at"] = json!(captured_at);
    Ok(Json(overview))
}

async fn counts(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let index = active_snapshot(&state).await?;
    Ok(Json(json!(state.summarizer.summarize(&index))))
}

async fn sections(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let index = active_snapshot(&state).await?;
    let counts = state.summarizer.summarize(&index);
    Ok(Json(json!(summarize_sections(&counts))))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub namespace: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub has_node_selector: bool,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResourceList<'a> {
    kind: ResourceKind,
    total: usize,
    items: Vec<&'a Resource>,
}

async fn list_resources(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let kind = ResourceKind::parse(&kind)
        .map_err(|err| ApiError::new(StatusCode::NOT_FOUND, err.to_string()))?;
    let index = active_snapshot(&state).await?;

    let predicate = FilterPredicate {
        namespace: params.namespace,
        status: params.status,
        has_node_selector: params.has_node_selector,
        search_term: params.search,
    };
    let resources = index.resources_of(kind);
    let items = filter(resources, &predicate);

    Ok(Json(ResourceList {
        kind,
        total: resources.len(),
        items,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub resource_types: Vec<String>,
    #[serde(default)]
    pub mode: SearchMode,
}

async fn search_resources(
    State(state): State<Arc<AppState>>,
    request: JsonBody<SearchRequest>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(|err| rejected(&state, err.into()))?;
    let index = active_snapshot(&state).await?;
    let started = Instant::now();

    let result = SearchQuery::from_ids(&request.components, &request.resource_types, request.mode)
        .and_then(|query| search(&query, &index));

    match result {
        Ok(result) => {
            let elapsed = started.elapsed().as_secs_f64();
            state.metrics.observe_search_latency(elapsed);
            state.metrics.inc_searches(request.mode);
            state.logger.log_search(request.mode, &result, elapsed);
            Ok(Json(result).into_response())
        }
        Err(err) => Err(rejected(&state, err.into())),
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub resource_types: Vec<String>,
}

async fn component_report(
    State(state): State<Arc<AppState>>,
    request: JsonBody<ReportRequest>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(|err| rejected(&state, err.into()))?;
    let index = active_snapshot(&state).await?;
    let started = Instant::now();

    let result = parse_selection(&request.components, &request.resource_types)
        .and_then(|(components, kinds)| aggregate(&components, &kinds, &index));

    match result {
        Ok(report) => {
            let elapsed = started.elapsed().as_secs_f64();
            state.metrics.observe_report_latency(elapsed);
            state.metrics.inc_reports();
            state
                .logger
                .log_report(report.rows.len(), report.components.len(), elapsed);
            Ok(Json(report).into_response())
        }
        Err(err) => Err(rejected(&state, err.into())),
    }
}

fn parse_selection(
    components: &[String],
    kinds: &[String],
) -> explorer_lib::Result<(Vec<ComponentKey>, Vec<ResourceKind>)> {
    let components = components
        .iter()
        .map(|id| ComponentKey::parse(id))
        .collect::<explorer_lib::Result<Vec<_>>>()?;
    let kinds = kinds
        .iter()
        .map(|id| ResourceKind::parse(id))
        .collect::<explorer_lib::Result<Vec<_>>>()?;
    Ok((components, kinds))
}

fn rejected(state: &AppState, err: ApiError) -> ApiError {
    if err.status == StatusCode::BAD_REQUEST {
        state.metrics.inc_query_errors();
        state.logger.log_query_rejected(&err.detail);
    }
    err
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/snapshot", get(get_snapshot).put(put_snapshot))
        .route(
            "/api/v1/snapshots/:cluster_id/:region",
            get(get_cached_snapshot),
        )
        .route("/api/v1/counts", get(counts))
        .route("/api/v1/sections", get(sections))
        .route("/api/v1/resources/search", post(search_resources))
        .route("/api/v1/resources/report", post(component_report))
        .route("/api/v1/resources/:kind", get(list_resources))
        .layer(body_limit)
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
