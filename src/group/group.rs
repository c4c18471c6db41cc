use super::error::CacheError;
use super::peers::{BoxFuture, PeerGetter, PeerPicker};
use super::stats::{GroupStats, StatsSnapshot};
use crate::cache::Cache;
use crate::cache::byteview::ByteView;

use anyhow::Result;
use std::future::Future;
use std::sync::{Arc, OnceLock};

/// Type-erased loader: computes the authoritative bytes for a key on a miss.
/// Any async closure or function with this shape can be used.
pub type LoaderFn = Arc<dyn Fn(String) -> BoxFuture<'static, Result<Vec<u8>>> + Send + Sync>;

/// A cache namespace.
///
/// Owns its local cache and loader. Requests for keys owned by another node
/// are forwarded through the registered [`PeerPicker`]; values fetched that
/// way are returned to the caller but not cached locally, so each value is
/// held by its owner only.
pub struct Group {
    name: String,
    loader: LoaderFn,
    main_cache: Cache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    stats: GroupStats,
}

impl Group {
    pub fn new<F, Fut>(name: impl Into<String>, cache_bytes: usize, loader: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        let loader: LoaderFn = Arc::new(move |key: String| {
            Box::pin(loader(key)) as BoxFuture<'static, Result<Vec<u8>>>
        });

        Self {
            name: name.into(),
            loader,
            main_cache: Cache::new(cache_bytes),
            peers: OnceLock::new(),
            stats: GroupStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches the peer picker used to route misses.
    ///
    /// # Panics
    /// Panics if a picker was already registered for this group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    /// Returns the value for `key`, consulting the local cache, then the
    /// owning peer, then the loader.
    pub async fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        GroupStats::incr(&self.stats.gets);

        if let Some(value) = self.main_cache.get(key) {
            GroupStats::incr(&self.stats.cache_hits);
            tracing::debug!("[{}] cache hit for {}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        if let Some(picker) = self.peers.get()
            && let Some(peer) = picker.pick_peer(key)
        {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    GroupStats::incr(&self.stats.peer_loads);
                    return Ok(value);
                }
                Err(e) => {
                    GroupStats::incr(&self.stats.peer_errors);
                    tracing::warn!("[{}] failed to get {} from peer: {}", self.name, key, e);
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let bytes = match (self.loader)(key.to_string()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                GroupStats::incr(&self.stats.local_load_errors);
                return Err(CacheError::Load(e));
            }
        };
        GroupStats::incr(&self.stats.local_loads);

        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache_len(&self) -> usize {
        self.main_cache.len()
    }

    pub fn cache_bytes_used(&self) -> usize {
        self.main_cache.bytes_used()
    }

    /// Whether `key` is currently held in this node's local cache.
    pub fn is_cached(&self, key: &str) -> bool {
        self.main_cache.contains(key)
    }
}
