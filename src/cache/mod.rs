//! Local Cache Module
//!
//! Node-local storage for cached values.
//!
//! ## Core Concepts
//! - **`ByteView`**: Immutable, cheaply clonable byte payload handed to callers.
//! - **`LruCache`**: Byte-budgeted LRU store. Unsynchronized.
//! - **`Cache`**: The `LruCache` behind a mutex, as owned by a namespace group.

pub mod byteview;
pub mod lru;


use parking_lot::Mutex;

use byteview::ByteView;
use lru::LruCache;

/// Thread-safe wrapper owned by a [`crate::group::group::Group`].
///
/// The underlying LRU is created on first insert so that namespaces that are
/// never populated cost nothing.
pub struct Cache {
    cache_bytes: usize,
    inner: Mutex<Option<LruCache<ByteView>>>,
}

impl Cache {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            inner: Mutex::new(None),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.inner.lock();
        guard.as_mut()?.get(key).cloned()
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.inner.lock();
        guard
            .get_or_insert_with(|| LruCache::new(self.cache_bytes))
            .add(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().as_ref().map(|lru| lru.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes_used(&self) -> usize {
        self.inner
            .lock()
            .as_ref()
            .map(|lru| lru.bytes_used())
            .unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .as_ref()
            .map(|lru| lru.contains(key))
            .unwrap_or(false)
    }
}
