//! The in-memory graph index.
//!
//! The registry maps each topic's URI to a shared per-topic entry
//! holding that topic's adjacency. It is built from scratch on service
//! open and on reload: first every topic is materialized, then every
//! link is distributed into the adjacency of each topic endpoint it
//! touches. The two passes matter: distributing a topic-to-topic link
//! needs both endpoints' entries to exist.

use crate::error::GraphError;
use crate::store::TopicStore;
use parking_lot::{Mutex, MutexGuard, RwLock};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use trellis_core::{Link, Topic, Uid};

/// Registry entry for one topic: the record plus its adjacency.
///
/// The adjacency maps a counterpart's URI to the link connecting it to
/// this topic; at most one link per counterpart is retained. The map
/// is behind a lock because link distribution at load time runs on
/// worker threads, and mutations run on concurrent request threads.
pub(crate) struct TopicEntry {
    topic: Topic,
    uri: String,
    links: RwLock<HashMap<String, Link>>,
    /// Serializes read-then-write mutation sequences on this topic.
    edit: Mutex<()>,
}

impl TopicEntry {
    pub(crate) fn new(topic: Topic) -> Self {
        let uri = topic.uri();
        Self {
            topic,
            uri,
            links: RwLock::new(HashMap::new()),
            edit: Mutex::new(()),
        }
    }

    pub(crate) fn topic(&self) -> &Topic {
        &self.topic
    }

    pub(crate) fn name(&self) -> &str {
        &self.topic.name
    }

    pub(crate) fn uri(&self) -> &str {
        &self.uri
    }

    /// Holds off other mutations on this topic while the guard lives.
    pub(crate) fn edit_guard(&self) -> MutexGuard<'_, ()> {
        self.edit.lock()
    }

    pub(crate) fn register(&self, counterpart_uri: String, link: Link) {
        self.links.write().insert(counterpart_uri, link);
    }

    pub(crate) fn unregister(&self, counterpart_uri: &str) -> Option<Link> {
        self.links.write().remove(counterpart_uri)
    }

    pub(crate) fn link_to(&self, counterpart_uri: &str) -> Option<Link> {
        self.links.read().get(counterpart_uri).cloned()
    }

    /// Snapshot of the adjacency as (counterpart URI, link) pairs.
    pub(crate) fn links_snapshot(&self) -> Vec<(String, Link)> {
        self.links
            .read()
            .iter()
            .map(|(uri, link)| (uri.clone(), link.clone()))
            .collect()
    }

    pub(crate) fn link_count(&self) -> usize {
        self.links.read().len()
    }
}

/// URI → entry map preserving insertion order for deterministic
/// iteration (the order itself carries no meaning).
#[derive(Default)]
pub(crate) struct Registry {
    by_uri: HashMap<String, Arc<TopicEntry>>,
    order: Vec<String>,
}

impl Registry {
    pub(crate) fn insert(&mut self, entry: Arc<TopicEntry>) {
        let uri = entry.uri().to_string();
        if self.by_uri.insert(uri.clone(), entry).is_none() {
            self.order.push(uri);
        }
    }

    pub(crate) fn get(&self, uri: &str) -> Option<Arc<TopicEntry>> {
        self.by_uri.get(uri).cloned()
    }

    pub(crate) fn get_by_name(&self, name: &str) -> Option<Arc<TopicEntry>> {
        self.iter().find(|entry| entry.name() == name).cloned()
    }

    pub(crate) fn remove(&mut self, uri: &str) -> Option<Arc<TopicEntry>> {
        let removed = self.by_uri.remove(uri);
        if removed.is_some() {
            self.order.retain(|u| u != uri);
        }
        removed
    }

    /// Entries in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<TopicEntry>> {
        self.order.iter().filter_map(|uri| self.by_uri.get(uri))
    }

    pub(crate) fn len(&self) -> usize {
        self.by_uri.len()
    }
}

/// Builds a fresh registry from the store.
///
/// Pass one materializes every topic entry in load order. Pass two
/// distributes links in parallel; per-entry adjacency locking makes
/// concurrent insertion into one topic's map safe.
pub(crate) fn build<S: TopicStore>(store: &S) -> Result<Registry, GraphError> {
    info!("topics loading...");

    let mut registry = Registry::default();
    for topic in store.load_topics()? {
        registry.insert(Arc::new(TopicEntry::new(topic)));
    }

    let links = store.load_links()?;
    links.par_iter().for_each(|link| distribute(&registry, link));

    info!(
        topics = registry.len(),
        links = links.len(),
        "topics loaded"
    );
    Ok(registry)
}

/// Registers a link into the adjacency of every topic endpoint it
/// touches. A link whose topic endpoint is no longer registered is
/// skipped: deletes do not cascade, so dangling links are expected.
fn distribute(registry: &Registry, link: &Link) {
    if let Uid::Topic(topic) = &link.from {
        match registry.get(&topic.uri()) {
            Some(entry) => entry.register(link.to.uri(), link.clone()),
            None => debug!(id = link.id, uri = %topic.uri(), "skipping dangling link"),
        }
    }
    if let Uid::Topic(topic) = &link.to {
        match registry.get(&topic.uri()) {
            Some(entry) => entry.register(link.from.uri(), link.clone()),
            None => debug!(id = link.id, uri = %topic.uri(), "skipping dangling link"),
        }
    }
}
