use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use super::protocol::{
    CONTENT_TYPE_OCTET_STREAM, ENDPOINT_API, ENDPOINT_STATS, NamespaceStats, StatsResponse,
    normalize_base_path,
};
use crate::group::error::CacheError;
use crate::group::registry::Registry;

/// Shared state of the HTTP handlers of one node.
pub struct NodeContext {
    pub registry: Arc<Registry>,
    /// This node's address, used in logs and the stats payload.
    pub node: String,
    pub base_path: String,
}

impl NodeContext {
    pub fn new(registry: Arc<Registry>, node: impl Into<String>, base_path: &str) -> Arc<Self> {
        Arc::new(Self {
            registry,
            node: node.into(),
            base_path: normalize_base_path(base_path),
        })
    }
}

/// Router answering peer fetches under the context's base path.
pub fn peer_router(ctx: Arc<NodeContext>) -> Router {
    Router::new()
        .route(&format!("{}/*rest", ctx.base_path), get(handle_peer_get))
        .route(&format!("{}/", ctx.base_path), get(handle_bad_peer_path))
        .layer(Extension(ctx))
}

/// Client-facing router: `/api/:namespace/:key` and `/stats`.
pub fn api_router(ctx: Arc<NodeContext>) -> Router {
    Router::new()
        .route(&format!("{}/:namespace/:key", ENDPOINT_API), get(handle_api_get))
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(ctx))
}

/// Splits `{base}/{namespace}/{key}` into its decoded segments. The key is
/// everything after the first `/`, so it may itself contain slashes.
pub fn parse_peer_path(path: &str, base_path: &str) -> Option<(String, String)> {
    let rest = path.strip_prefix(base_path)?.strip_prefix('/')?;
    let (namespace, key) = rest.split_once('/')?;
    let namespace = urlencoding::decode(namespace).ok()?;
    let key = urlencoding::decode(key).ok()?;
    Some((namespace.into_owned(), key.into_owned()))
}

pub async fn handle_peer_get(Extension(ctx): Extension<Arc<NodeContext>>, uri: Uri) -> Response {
    let path = uri.path();
    tracing::info!("[Server {}] GET {}", ctx.node, path);

    match parse_peer_path(path, &ctx.base_path) {
        Some((namespace, key)) => serve_value(&ctx, &namespace, &key).await,
        None => (StatusCode::BAD_REQUEST, "bad request").into_response(),
    }
}

/// The wildcard route does not match an empty remainder.
pub async fn handle_bad_peer_path(Extension(ctx): Extension<Arc<NodeContext>>, uri: Uri) -> Response {
    tracing::info!("[Server {}] GET {}", ctx.node, uri.path());
    (StatusCode::BAD_REQUEST, "bad request").into_response()
}

pub async fn handle_api_get(
    Extension(ctx): Extension<Arc<NodeContext>>,
    Path((namespace, key)): Path<(String, String)>,
) -> Response {
    serve_value(&ctx, &namespace, &key).await
}

pub async fn handle_stats(Extension(ctx): Extension<Arc<NodeContext>>) -> Json<StatsResponse> {
    let namespaces = ctx
        .registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let group = ctx.registry.get(&name)?;
            let stats = NamespaceStats {
                cache_entries: group.cache_len(),
                cache_bytes: group.cache_bytes_used(),
                counters: group.stats(),
            };
            Some((name, stats))
        })
        .collect();

    Json(StatsResponse {
        node: ctx.node.clone(),
        namespaces,
    })
}

async fn serve_value(ctx: &NodeContext, namespace: &str, key: &str) -> Response {
    let Some(group) = ctx.registry.get(namespace) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such namespace: {}", namespace),
        )
            .into_response();
    };

    match group.get(key).await {
        Ok(view) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            view.to_vec(),
        )
            .into_response(),
        Err(CacheError::EmptyKey) => (StatusCode::BAD_REQUEST, "key is required").into_response(),
        Err(e) => {
            tracing::error!("[Server {}] {}/{} failed: {}", ctx.node, namespace, key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
