//! Node configuration, read from the command line with environment fallbacks.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use crate::transport::pool::PoolOptions;
use crate::transport::protocol::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

#[derive(Debug, Clone, Parser)]
#[command(name = "ringcache", version, about = "Distributed read-through cache node")]
pub struct NodeConfig {
    /// This node's peer URL, exactly as it appears in --peers.
    #[arg(long, env = "RINGCACHE_ADDR", default_value = "http://localhost:8001")]
    pub addr: String,

    /// Comma separated peer URLs, including this node.
    #[arg(long, env = "RINGCACHE_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Optional bind address for the client API, e.g. 127.0.0.1:9999.
    #[arg(long, env = "RINGCACHE_API")]
    pub api: Option<String>,

    #[arg(long, env = "RINGCACHE_BASE_PATH", default_value = DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// Virtual ring positions per peer.
    #[arg(long, env = "RINGCACHE_REPLICAS", default_value_t = DEFAULT_REPLICAS)]
    pub replicas: usize,

    /// Byte budget of each namespace's local cache (0 = unbounded).
    #[arg(long, env = "RINGCACHE_CACHE_BYTES", default_value_t = 2 << 10)]
    pub cache_bytes: usize,

    #[arg(long, env = "RINGCACHE_PEER_TIMEOUT_MS", default_value_t = 500)]
    pub peer_timeout_ms: u64,

    #[arg(long, env = "RINGCACHE_PEER_ATTEMPTS", default_value_t = 1)]
    pub peer_attempts: usize,

    /// Seconds between stats log lines; 0 disables the reporter.
    #[arg(long, env = "RINGCACHE_STATS_INTERVAL_SECS", default_value_t = 30)]
    pub stats_interval_secs: u64,
}

impl NodeConfig {
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            timeout: Duration::from_millis(self.peer_timeout_ms),
            attempts: self.peer_attempts,
        }
    }

    /// Peer list to put on the ring. A node started without peers serves
    /// only itself.
    pub fn ring_members(&self) -> Vec<String> {
        if self.peers.is_empty() {
            vec![self.addr.clone()]
        } else {
            self.peers.clone()
        }
    }

    /// `host:port` the peer server listens on, taken from `addr`.
    pub fn bind_addr(&self) -> Result<String> {
        let url = reqwest::Url::parse(&self.addr)
            .with_context(|| format!("invalid node address: {}", self.addr))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("node address has no host: {}", self.addr))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| anyhow::anyhow!("node address has no port: {}", self.addr))?;
        Ok(format!("{}:{}", host, port))
    }
}
