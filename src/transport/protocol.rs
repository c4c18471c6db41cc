//! Peer Wire Protocol
//!
//! A peer fetch is a plain HTTP GET:
//!
//! ```text
//!   GET {peer}{base_path}/{urlencode(namespace)}/{urlencode(key)}
//!
//!   200  application/octet-stream   raw cached bytes
//!   400  path is not exactly <namespace>/<key>
//!   404  unknown namespace
//!   500  the owner's loader failed
//! ```
//!
//! Anything other than 200 is a failed fetch for the requesting node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::group::stats::StatsSnapshot;

/// Default prefix for peer-to-peer requests.
pub const DEFAULT_BASE_PATH: &str = "/_ringcache";
/// Default number of virtual ring positions per peer.
pub const DEFAULT_REPLICAS: usize = 50;

/// Client-facing read endpoint, mounted as `/api/:namespace/:key`.
pub const ENDPOINT_API: &str = "/api";
/// Client-facing stats endpoint.
pub const ENDPOINT_STATS: &str = "/stats";

pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Builds the peer URL for one key. `base_url` already carries the base path.
pub fn peer_url(base_url: &str, namespace: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url,
        urlencoding::encode(namespace),
        urlencoding::encode(key)
    )
}

/// Normalizes a base path to `/segment` form with no trailing slash.
pub fn normalize_base_path(base_path: &str) -> String {
    let cleaned = base_path.trim_end_matches('/');
    if cleaned.is_empty() {
        String::new()
    } else if cleaned.starts_with('/') {
        cleaned.to_string()
    } else {
        format!("/{}", cleaned)
    }
}

/// Per-namespace view returned by the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamespaceStats {
    pub cache_entries: usize,
    pub cache_bytes: usize,
    pub counters: StatsSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsResponse {
    pub node: String,
    pub namespaces: BTreeMap<String, NamespaceStats>,
}
