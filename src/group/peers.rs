//! Peer Contracts
//!
//! The two capabilities a group needs from the transport layer: choosing the
//! peer that owns a key, and fetching a value from that peer. The HTTP
//! implementation lives in [`crate::transport::pool`].

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches raw cached bytes from one specific peer.
pub trait PeerGetter: Send + Sync {
    fn get<'a>(&'a self, namespace: &'a str, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when this node is the owner or no
    /// peers are configured. Must be deterministic for a fixed peer set.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
