use super::protocol::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS, normalize_base_path, peer_url};
use crate::group::peers::{BoxFuture, PeerGetter, PeerPicker};
use crate::ring::HashRing;

use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Path prefix peers serve the cache under.
    pub base_path: String,
    /// Virtual ring positions per peer.
    pub replicas: usize,
    /// Timeout for a single peer request.
    pub timeout: Duration,
    /// Send attempts per fetch; transport errors are retried, HTTP errors are not.
    pub attempts: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            timeout: Duration::from_millis(500),
            attempts: 1,
        }
    }
}

struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// The set of HTTP peers of this node.
///
/// Owns the consistent hash ring and one [`HttpGetter`] per peer, and acts as
/// the [`PeerPicker`] for every group on the node.
pub struct HttpPool {
    self_url: String,
    options: PoolOptions,
    client: reqwest::Client,
    state: Mutex<PoolState>,
}

impl HttpPool {
    /// `self_url` is this node's own address as it appears in the peer list,
    /// e.g. `http://10.0.0.1:8001`. Trailing slashes are ignored, as they are
    /// for peers.
    pub fn new(self_url: impl Into<String>, options: PoolOptions) -> Self {
        let options = PoolOptions {
            base_path: normalize_base_path(&options.base_path),
            attempts: options.attempts.max(1),
            ..options
        };
        let state = PoolState {
            ring: HashRing::new(options.replicas, None),
            getters: HashMap::new(),
        };

        Self {
            self_url: self_url.into().trim_end_matches('/').to_string(),
            options,
            client: reqwest::Client::new(),
            state: Mutex::new(state),
        }
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    /// Replaces the peer set. The ring and the getters are rebuilt from
    /// scratch; nothing from the previous set is kept.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| peer.as_ref().trim_end_matches('/').to_string())
            .filter(|peer| !peer.is_empty())
            .collect();

        let mut ring = HashRing::new(self.options.replicas, None);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.options.base_path),
                    self.client.clone(),
                    self.options.timeout,
                    self.options.attempts,
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        let mut state = self.state.lock();
        state.ring = ring;
        state.getters = getters;

        tracing::info!("[Server {}] peer set: {:?}", self.self_url, peers);
    }

    /// Peers currently on the ring, sorted.
    pub fn peers(&self) -> Vec<String> {
        self.state.lock().ring.nodes()
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();
        let peer = state.ring.get(key)?;
        if peer == self.self_url {
            return None;
        }
        tracing::info!("[Server {}] pick peer {}", self.self_url, peer);
        state
            .getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}

/// HTTP client for a single peer.
pub struct HttpGetter {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    attempts: usize,
}

impl HttpGetter {
    /// `base_url` is the peer address including the base path.
    pub fn new(base_url: String, client: reqwest::Client, timeout: Duration, attempts: usize) -> Self {
        Self {
            base_url,
            client,
            timeout,
            attempts: attempts.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut delay_ms = 50u64;

        for attempt in 0..self.attempts {
            let response = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        return Err(anyhow::anyhow!(e));
                    }
                    let jitter = rand::random::<u64>() % 25;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(800);
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }

    pub async fn fetch(&self, namespace: &str, key: &str) -> Result<Vec<u8>> {
        let url = peer_url(&self.base_url, namespace, key);
        let response = self.get_with_retry(&url).await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(anyhow::anyhow!("server returned: {}", response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("reading response body: {}", e))?;
        Ok(bytes.to_vec())
    }
}

impl PeerGetter for HttpGetter {
    fn get<'a>(&'a self, namespace: &'a str, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(self.fetch(namespace, key))
    }
}
