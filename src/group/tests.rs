//! Group Module Tests
//!
//! ## Test Scopes
//! - **Group**: Local hits, loader fallback, peer routing and error propagation.
//! - **Registry**: Creation, lookup and replacement of namespaces.
//!
//! Peers are simulated with in-process stubs; the HTTP transport is covered in
//! the transport tests.

#[cfg(test)]
mod tests {
    use crate::group::error::CacheError;
    use crate::group::group::Group;
    use crate::group::peers::{BoxFuture, PeerGetter, PeerPicker};
    use crate::group::registry::Registry;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_db() -> Arc<HashMap<String, String>> {
        Arc::new(HashMap::from([
            ("Tom".to_string(), "630".to_string()),
            ("Jack".to_string(), "589".to_string()),
            ("Sam".to_string(), "567".to_string()),
        ]))
    }

    /// Group backed by `sample_db` that counts loader calls per key.
    fn counting_group(name: &str, cache_bytes: usize) -> (Group, Arc<AtomicUsize>) {
        let db = sample_db();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let group = Group::new(name, cache_bytes, move |key: String| {
            let db = db.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                db.get(&key)
                    .map(|v| v.clone().into_bytes())
                    .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
            }
        });
        (group, calls)
    }

    struct StubGetter {
        response: Result<Vec<u8>, String>,
        calls: AtomicUsize,
    }

    impl PeerGetter for StubGetter {
        fn get<'a>(
            &'a self,
            _namespace: &'a str,
            _key: &'a str,
        ) -> BoxFuture<'a, anyhow::Result<Vec<u8>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = self.response.clone();
            Box::pin(async move { response.map_err(|e| anyhow::anyhow!(e)) })
        }
    }

    struct StubPicker {
        peer: Option<Arc<StubGetter>>,
    }

    impl PeerPicker for StubPicker {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            self.peer
                .clone()
                .map(|peer| peer as Arc<dyn PeerGetter>)
        }
    }

    fn stub_peer(response: Result<Vec<u8>, String>) -> Arc<StubGetter> {
        Arc::new(StubGetter {
            response,
            calls: AtomicUsize::new(0),
        })
    }

    // ============================================================
    // GROUP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_miss_loads_then_hits_cache() {
        // ARRANGE
        let (group, calls) = counting_group("scores", 2 << 10);

        // ACT
        let first = group.get("Tom").await.unwrap();
        let second = group.get("Tom").await.unwrap();

        // ASSERT: loader ran once, second read served locally
        assert_eq!(first.to_string(), "630");
        assert_eq!(second.to_string(), "630");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(group.is_cached("Tom"));

        let stats = group.stats();
        assert_eq!(stats.gets, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.local_loads, 1);
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected() {
        let (group, calls) = counting_group("scores", 0);

        let result = group.get("").await;

        assert!(matches!(result, Err(CacheError::EmptyKey)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loader_error_is_propagated_verbatim() {
        let (group, _) = counting_group("scores", 0);

        let err = group.get("unknown").await.unwrap_err();

        assert!(matches!(err, CacheError::Load(_)));
        assert_eq!(err.to_string(), "unknown not exist");
        assert!(!group.is_cached("unknown"));
        assert_eq!(group.stats().local_load_errors, 1);
    }

    #[tokio::test]
    async fn test_loader_is_called_again_after_failure() {
        let (group, calls) = counting_group("scores", 0);

        assert!(group.get("missing").await.is_err());
        assert!(group.get("missing").await.is_err());

        assert_eq!(calls.load(Ordering::SeqCst), 2, "Failures must not be cached");
    }

    #[tokio::test]
    async fn test_peer_value_is_returned_but_not_cached() {
        // ARRANGE
        let (group, calls) = counting_group("scores", 0);
        let peer = stub_peer(Ok(b"from-peer".to_vec()));
        group.register_peers(Arc::new(StubPicker {
            peer: Some(peer.clone()),
        }));

        // ACT
        let value = group.get("Tom").await.unwrap();

        // ASSERT
        assert_eq!(value.as_slice(), b"from-peer");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "Loader must not run");
        assert!(!group.is_cached("Tom"), "Remote values stay on their owner");
        assert_eq!(group.cache_len(), 0);

        // A second read goes to the peer again
        group.get("Tom").await.unwrap();
        assert_eq!(peer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(group.stats().peer_loads, 2);
    }

    #[tokio::test]
    async fn test_peer_failure_falls_back_to_loader() {
        let (group, calls) = counting_group("scores", 0);
        let peer = stub_peer(Err("connection refused".to_string()));
        group.register_peers(Arc::new(StubPicker {
            peer: Some(peer.clone()),
        }));

        let value = group.get("Jack").await.unwrap();

        assert_eq!(value.to_string(), "589");
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(group.is_cached("Jack"));
        assert_eq!(group.stats().peer_errors, 1);
    }

    #[tokio::test]
    async fn test_peer_failure_and_loader_failure_returns_loader_error() {
        let (group, _) = counting_group("scores", 0);
        group.register_peers(Arc::new(StubPicker {
            peer: Some(stub_peer(Err("timeout".to_string()))),
        }));

        let err = group.get("nobody").await.unwrap_err();

        assert_eq!(err.to_string(), "nobody not exist");
    }

    #[tokio::test]
    async fn test_self_owned_key_uses_loader() {
        let (group, calls) = counting_group("scores", 0);
        group.register_peers(Arc::new(StubPicker { peer: None }));

        assert_eq!(group.get("Sam").await.unwrap().to_string(), "567");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(group.is_cached("Sam"));
    }

    #[test]
    #[should_panic(expected = "register_peers called more than once")]
    fn test_register_peers_twice_panics() {
        let (group, _) = counting_group("scores", 0);
        group.register_peers(Arc::new(StubPicker { peer: None }));
        group.register_peers(Arc::new(StubPicker { peer: None }));
    }

    #[tokio::test]
    async fn test_cache_budget_bounds_group_memory() {
        let group = Group::new("numbers", 64, |key: String| async move {
            Ok(format!("value-of-{}", key).into_bytes())
        });

        for i in 0..100 {
            group.get(&format!("k{}", i)).await.unwrap();
        }

        assert!(group.cache_bytes_used() <= 64);
        assert!(group.is_cached("k99"));
        assert!(!group.is_cached("k0"));
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_cache() {
        let (group, calls) = counting_group("scores", 0);
        let group = Arc::new(group);
        group.get("Tom").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("Tom").await.unwrap() }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().to_string(), "630");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ============================================================
    // REGISTRY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_registry_create_and_lookup() {
        let registry = Registry::new();

        let created = registry
            .create_namespace("scores", 1024, |key: String| async move { Ok(key.into_bytes()) })
            .unwrap();

        let found = registry.get("scores").expect("namespace should exist");
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(found.name(), "scores");
        assert!(registry.get("missing").is_none());
        assert_eq!(found.get("echo").await.unwrap().to_string(), "echo");
    }

    #[test]
    fn test_registry_last_writer_wins() {
        let registry = Registry::new();
        let first = registry
            .create_namespace("dup", 0, |_key: String| async { Ok(b"first".to_vec()) })
            .unwrap();
        let second = registry
            .create_namespace("dup", 0, |_key: String| async { Ok(b"second".to_vec()) })
            .unwrap();

        let found = registry.get("dup").unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert!(!Arc::ptr_eq(&found, &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_rejects_empty_name() {
        let registry = Registry::new();

        let result = registry.create_namespace("", 0, |_key: String| async { Ok(Vec::new()) });

        assert!(matches!(result, Err(CacheError::InvalidNamespace(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_names_are_sorted() {
        let registry = Registry::new();
        for name in ["users", "scores", "books"] {
            registry
                .create_namespace(name, 0, |_key: String| async { Ok(Vec::new()) })
                .unwrap();
        }

        assert_eq!(registry.names(), vec!["books", "scores", "users"]);
    }
}
