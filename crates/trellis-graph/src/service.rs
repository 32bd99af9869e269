//! The graph service: entry point for topic lookup and lifecycle.
//!
//! One `TopicService` is shared by all request threads. It owns the
//! registry, rebuilds it on [`TopicService::reload`], and hands out
//! [`TopicHandle`]s pointing at registered entries.

use crate::error::Result;
use crate::registry::{self, Registry, TopicEntry};
use crate::store::TopicStore;
use crate::topic::TopicHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use trellis_core::{uri, EntityKind, Topic};

/// Shared service state. Handles hold an `Arc` of this so mutations can
/// reach the store and the registry without going through the service.
pub(crate) struct ServiceInner<S: TopicStore> {
    pub(crate) store: S,
    pub(crate) registry: RwLock<Registry>,
}

impl<S: TopicStore> ServiceInner<S> {
    /// Replaces the registry wholesale with a fresh build.
    ///
    /// Handles obtained before the swap keep pointing at the old
    /// entries and are stale; callers re-fetch after a reload.
    pub(crate) fn reload(&self) -> Result<()> {
        let fresh = registry::build(&self.store)?;
        *self.registry.write() = fresh;
        Ok(())
    }

    /// Returns the registered entry for `name`, persisting and
    /// registering a new topic if none exists.
    ///
    /// Safe against concurrent calls and concurrent reloads: after the
    /// save, registration is re-checked under the registry write lock
    /// so a racing registration wins and the saved record (same URI,
    /// same content) is simply not registered twice.
    pub(crate) fn find_or_create_entry(&self, name: &str) -> Result<Arc<TopicEntry>> {
        let topic_uri = uri::generate(EntityKind::Topic, name);
        if let Some(entry) = self.registry.read().get(&topic_uri) {
            return Ok(entry);
        }

        let topic = self.store.save_topic(Topic::new(name))?;
        debug!(uri = %topic_uri, "topic created");

        let mut registry = self.registry.write();
        Ok(match registry.get(&topic_uri) {
            Some(entry) => entry,
            None => {
                let entry = Arc::new(TopicEntry::new(topic));
                registry.insert(entry.clone());
                entry
            }
        })
    }
}

/// Handle-style service over a [`TopicStore`]; cheap to clone and share
/// across threads.
pub struct TopicService<S: TopicStore> {
    pub(crate) inner: Arc<ServiceInner<S>>,
}

impl<S: TopicStore> Clone for TopicService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: TopicStore> TopicService<S> {
    /// Opens the service, building the index from the store.
    pub fn open(store: S) -> Result<Self> {
        let registry = registry::build(&store)?;
        Ok(Self {
            inner: Arc::new(ServiceInner {
                store,
                registry: RwLock::new(registry),
            }),
        })
    }

    /// Looks up a registered topic by URI.
    pub fn get(&self, uri: &str) -> Option<TopicHandle<S>> {
        let entry = self.inner.registry.read().get(uri)?;
        Some(TopicHandle::new(self.inner.clone(), entry))
    }

    /// Returns the topic named `name`, creating and registering it if
    /// unknown.
    pub fn find_or_create(&self, name: &str) -> Result<TopicHandle<S>> {
        let entry = self.inner.find_or_create_entry(name)?;
        Ok(TopicHandle::new(self.inner.clone(), entry))
    }

    /// Rebuilds the index from the store. Previously returned handles
    /// are stale afterwards.
    pub fn reload(&self) -> Result<()> {
        self.inner.reload()
    }

    /// Whether some registered topic has exactly this name.
    ///
    /// Matches on name, not URI, unlike [`TopicService::get`].
    pub fn has_topic(&self, name: &str) -> bool {
        self.inner
            .registry
            .read()
            .iter()
            .any(|entry| entry.name() == name)
    }

    /// All registered topics in insertion order.
    pub fn topics(&self) -> Vec<TopicHandle<S>> {
        self.inner
            .registry
            .read()
            .iter()
            .map(|entry| TopicHandle::new(self.inner.clone(), entry.clone()))
            .collect()
    }

    /// Index statistics.
    pub fn stats(&self) -> GraphStats {
        let registry = self.inner.registry.read();
        let mut seen = HashSet::new();
        for entry in registry.iter() {
            for (_, link) in entry.links_snapshot() {
                seen.insert(link.id);
            }
        }
        GraphStats {
            topics: registry.len(),
            links: seen.len(),
        }
    }
}

/// Counts over the current index contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub topics: usize,
    /// Distinct links registered in any adjacency.
    pub links: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> TopicService<MemoryStore> {
        TopicService::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_find_or_create_then_get() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        assert_eq!(alpha.uri(), "topic/Alpha");

        let fetched = service.get("topic/Alpha").unwrap();
        assert_eq!(fetched.name(), "Alpha");
        assert!(service.get("topic/Beta").is_none());
    }

    #[test]
    fn test_find_or_create_is_registered_after_reload() {
        let service = service();
        service.find_or_create("Alpha").unwrap();
        service.reload().unwrap();
        assert_eq!(service.get("topic/Alpha").unwrap().name(), "Alpha");
    }

    #[test]
    fn test_find_or_create_returns_existing_entry() {
        let service = service();
        service.find_or_create("Alpha").unwrap();
        service.find_or_create("Alpha").unwrap();
        assert_eq!(service.topics().len(), 1);
        assert_eq!(service.stats().topics, 1);
    }

    #[test]
    fn test_has_topic_matches_on_name_not_uri() {
        let service = service();
        service.find_or_create("Alpha").unwrap();
        assert!(service.has_topic("Alpha"));
        assert!(!service.has_topic("topic/Alpha"));
        assert!(!service.has_topic("Beta"));
    }

    #[test]
    fn test_reload_is_a_fixed_point() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();

        service.reload().unwrap();
        let first = service.stats();
        service.reload().unwrap();
        assert_eq!(service.stats(), first);
        assert_eq!(first, GraphStats { topics: 2, links: 1 });
    }

    #[test]
    fn test_concurrent_find_or_create_registers_once() {
        let service = service();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let service = service.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        service.find_or_create("Shared").unwrap();
                    }
                });
            }
        });
        assert_eq!(service.topics().len(), 1);
        assert_eq!(service.inner.store.load_topics().unwrap().len(), 1);
    }
}
