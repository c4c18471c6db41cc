//! Namespace Registry
//!
//! Process-scoped table of namespace groups. Built once at startup and shared
//! by reference with the HTTP handlers, which resolve the namespace segment of
//! each request through it.

use super::error::CacheError;
use super::group::Group;

use anyhow::Result;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;

pub struct Registry {
    groups: DashMap<String, Arc<Group>>,
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a group with an empty cache of `cache_bytes` and stores it
    /// under `name`, replacing any previous group with that name.
    pub fn create_namespace<F, Fut>(
        &self,
        name: &str,
        cache_bytes: usize,
        loader: F,
    ) -> Result<Arc<Group>, CacheError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        if name.is_empty() {
            return Err(CacheError::InvalidNamespace(name.to_string()));
        }

        let group = Arc::new(Group::new(name, cache_bytes, loader));
        if self.groups.insert(name.to_string(), group.clone()).is_some() {
            tracing::warn!("Replaced existing namespace: {}", name);
        } else {
            tracing::info!("Created namespace {} ({} bytes)", name, cache_bytes);
        }
        Ok(group)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.get(name).map(|entry| entry.value().clone())
    }

    /// Names of all registered namespaces, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            groups: DashMap::new(),
        }
    }
}
