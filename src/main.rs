use clap::Parser;
use ringcache::config::NodeConfig;
use ringcache::group::registry::Registry;
use ringcache::transport::handlers::{NodeContext, api_router, peer_router};
use ringcache::transport::pool::HttpPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = NodeConfig::parse();
    let bind_addr = config.bind_addr()?;

    tracing::info!("Starting node {}", config.addr);

    // 1. Namespaces:
    let registry = Registry::new();
    let db = Arc::new(sample_scores());
    let scores = registry.create_namespace("scores", config.cache_bytes, move |key: String| {
        let db = db.clone();
        async move {
            tracing::info!("[SlowDB] search key {}", key);
            tokio::time::sleep(Duration::from_millis(50)).await;
            db.get(&key)
                .map(|v| v.clone().into_bytes())
                .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
        }
    })?;

    // 2. Peer pool:
    let pool = Arc::new(HttpPool::new(config.addr.clone(), config.pool_options()));
    pool.set_peers(config.ring_members());
    scores.register_peers(pool.clone());

    let ctx = NodeContext::new(registry.clone(), config.addr.clone(), pool.base_path());

    // 3. Client API:
    if let Some(api_addr) = config.api.clone() {
        let api = api_router(ctx.clone());
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        tracing::info!("API server listening on {}", api_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api).await {
                tracing::error!("API server stopped: {}", e);
            }
        });
    }

    // 4. Stats reporter:
    if config.stats_interval_secs > 0 {
        let stats_registry = registry.clone();
        let period = Duration::from_secs(config.stats_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;
                for name in stats_registry.names() {
                    if let Some(group) = stats_registry.get(&name) {
                        let stats = group.stats();
                        tracing::info!(
                            "  - {} entries={} bytes={} gets={} hits={} peer={} peer_err={} local={} local_err={}",
                            name,
                            group.cache_len(),
                            group.cache_bytes_used(),
                            stats.gets,
                            stats.cache_hits,
                            stats.peer_loads,
                            stats.peer_errors,
                            stats.local_loads,
                            stats.local_load_errors
                        );
                    }
                }
            }
        });
    }

    // 5. Peer server:
    let app = peer_router(ctx);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Peer server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");
    axum::serve(listener, app).await?;

    Ok(())
}

fn sample_scores() -> HashMap<String, String> {
    HashMap::from([
        ("Tom".to_string(), "630".to_string()),
        ("Jack".to_string(), "589".to_string()),
        ("Sam".to_string(), "567".to_string()),
    ])
}
