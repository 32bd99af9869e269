//! Backing-store contract and implementations.
//!
//! The graph index treats persistence as an opaque collaborator with a
//! narrow contract: load everything of a collection, save one record,
//! remove one record. [`SledStore`] is the durable implementation;
//! [`MemoryStore`] backs tests and ephemeral use.

use crate::error::StoreError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use trellis_core::{Link, LinkDraft, LinkId, Topic};

/// Minimal persistence contract for topics and links.
///
/// Implementations must be safe to share across request threads.
pub trait TopicStore: Send + Sync + 'static {
    fn load_topics(&self) -> Result<Vec<Topic>, StoreError>;

    fn load_links(&self) -> Result<Vec<Link>, StoreError>;

    /// Saves a topic, keyed by its URI. Saving an existing topic is a
    /// no-op overwrite.
    fn save_topic(&self, topic: Topic) -> Result<Topic, StoreError>;

    /// Persists a draft, assigning its id.
    fn save_link(&self, draft: LinkDraft) -> Result<Link, StoreError>;

    fn remove_link(&self, id: LinkId) -> Result<(), StoreError>;

    fn remove_topic(&self, uri: &str) -> Result<(), StoreError>;
}

/// Sled-backed store.
///
/// One tree per collection, bincode-encoded values. Topics are keyed by
/// URI, links by a big-endian id from sled's id generator.
pub struct SledStore {
    db: sled::Db,
    topics: sled::Tree,
    links: sled::Tree,
}

impl SledStore {
    /// Opens or creates a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let topics = db.open_tree("topics")?;
        let links = db.open_tree("links")?;
        Ok(Self { db, topics, links })
    }
}

impl TopicStore for SledStore {
    fn load_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let mut out = Vec::new();
        for entry in self.topics.iter() {
            let (_key, value) = entry?;
            out.push(bincode::deserialize(&value)?);
        }
        Ok(out)
    }

    fn load_links(&self) -> Result<Vec<Link>, StoreError> {
        let mut out = Vec::new();
        for entry in self.links.iter() {
            let (_key, value) = entry?;
            out.push(bincode::deserialize(&value)?);
        }
        Ok(out)
    }

    fn save_topic(&self, topic: Topic) -> Result<Topic, StoreError> {
        let bytes = bincode::serialize(&topic)?;
        self.topics.insert(topic.uri().as_bytes(), bytes)?;
        self.topics.flush()?;
        Ok(topic)
    }

    fn save_link(&self, draft: LinkDraft) -> Result<Link, StoreError> {
        let id = self.db.generate_id()?;
        let link = draft.into_link(id);
        self.links
            .insert(id.to_be_bytes(), bincode::serialize(&link)?)?;
        self.links.flush()?;
        Ok(link)
    }

    fn remove_link(&self, id: LinkId) -> Result<(), StoreError> {
        self.links.remove(id.to_be_bytes())?;
        self.links.flush()?;
        Ok(())
    }

    fn remove_topic(&self, uri: &str) -> Result<(), StoreError> {
        self.topics.remove(uri.as_bytes())?;
        self.topics.flush()?;
        Ok(())
    }
}

/// In-memory store with the same contract.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    topics: BTreeMap<String, Topic>,
    links: BTreeMap<LinkId, Link>,
    next_id: LinkId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TopicStore for MemoryStore {
    fn load_topics(&self) -> Result<Vec<Topic>, StoreError> {
        Ok(self.inner.lock().topics.values().cloned().collect())
    }

    fn load_links(&self) -> Result<Vec<Link>, StoreError> {
        Ok(self.inner.lock().links.values().cloned().collect())
    }

    fn save_topic(&self, topic: Topic) -> Result<Topic, StoreError> {
        self.inner.lock().topics.insert(topic.uri(), topic.clone());
        Ok(topic)
    }

    fn save_link(&self, draft: LinkDraft) -> Result<Link, StoreError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let link = draft.into_link(inner.next_id);
        inner.links.insert(link.id, link.clone());
        Ok(link)
    }

    fn remove_link(&self, id: LinkId) -> Result<(), StoreError> {
        self.inner.lock().links.remove(&id);
        Ok(())
    }

    fn remove_topic(&self, uri: &str) -> Result<(), StoreError> {
        self.inner.lock().topics.remove(uri);
        Ok(())
    }
}
