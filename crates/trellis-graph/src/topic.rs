//! Per-topic view: traversal, mutation, and resource aggregation.
//!
//! A `TopicHandle` wraps one registered entry plus the shared service
//! state, so it can navigate to other registered topics and write
//! through to the store. Traversal always resolves counterparts
//! through the registry and returns canonical registered handles,
//! never detached copies.

use crate::error::{GraphError, Result};
use crate::registry::TopicEntry;
use crate::service::ServiceInner;
use crate::store::TopicStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use trellis_core::{EntityKind, Link, LinkDraft, LinkKind, Topic, Uid};

/// A topic registered in the graph index.
pub struct TopicHandle<S: TopicStore> {
    inner: Arc<ServiceInner<S>>,
    entry: Arc<TopicEntry>,
}

impl<S: TopicStore> Clone for TopicHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            entry: self.entry.clone(),
        }
    }
}

impl<S: TopicStore> TopicHandle<S> {
    pub(crate) fn new(inner: Arc<ServiceInner<S>>, entry: Arc<TopicEntry>) -> Self {
        Self { inner, entry }
    }

    pub fn name(&self) -> &str {
        self.entry.name()
    }

    pub fn uri(&self) -> &str {
        self.entry.uri()
    }

    pub fn topic(&self) -> &Topic {
        self.entry.topic()
    }

    /// Snapshot of this topic's adjacency links.
    pub fn links(&self) -> Vec<Link> {
        self.entry
            .links_snapshot()
            .into_iter()
            .map(|(_, link)| link)
            .collect()
    }

    // ── traversal ────────────────────────────────────────────────────

    /// Topics this topic points at with a `Child` link.
    pub fn children(&self) -> Vec<TopicHandle<S>> {
        let own_uri = self.entry.uri().to_string();
        self.collect_topics(move |link| {
            link.kind == Some(LinkKind::Child)
                && matches!(&link.from, Uid::Topic(t) if t.uri() == own_uri)
        })
    }

    /// Topics pointing at this topic with a child-family link.
    pub fn parents(&self) -> Vec<TopicHandle<S>> {
        let own_uri = self.entry.uri().to_string();
        self.collect_topics(move |link| {
            link.is_child() && matches!(&link.to, Uid::Topic(t) if t.uri() == own_uri)
        })
    }

    /// Topics connected by an untyped link; direction carries no
    /// meaning here.
    pub fn related(&self) -> Vec<TopicHandle<S>> {
        self.collect_topics(|link| link.kind.is_none())
    }

    /// Counterpart topics whose links pass `keep`, resolved to their
    /// registered entries. Counterparts missing from the registry
    /// (non-topics, or topics deleted since the link was made) are
    /// skipped.
    fn collect_topics(&self, keep: impl Fn(&Link) -> bool) -> Vec<TopicHandle<S>> {
        let registry = self.inner.registry.read();
        self.entry
            .links_snapshot()
            .into_iter()
            .filter(|(_, link)| keep(link))
            .filter_map(|(counterpart_uri, _)| registry.get(&counterpart_uri))
            .map(|entry| TopicHandle::new(self.inner.clone(), entry))
            .collect()
    }

    /// Non-topic attachments, partitioned by entity kind.
    pub fn resources(&self) -> TopicResources {
        let mut resources = TopicResources::default();
        for (_, link) in self.entry.links_snapshot() {
            let resource = link.counterpart_of(self.entry.uri()).clone();
            let slot = match resource.kind() {
                EntityKind::Topic => continue,
                EntityKind::Video => &mut resources.video,
                EntityKind::Item => &mut resources.item,
                EntityKind::ItemsRange => &mut resources.items_range,
                EntityKind::Document => &mut resources.document,
            };
            slot.push(AttachedResource { resource, link });
        }
        resources
    }

    // ── mutation ─────────────────────────────────────────────────────

    /// Links this topic to `target`, persisting the link and updating
    /// the adjacency on both sides when the target is a topic.
    ///
    /// At most one link per counterpart is kept. An existing untyped
    /// link may be superseded by anything; an existing child-family
    /// link only by another child-family link; any other existing kind
    /// fails with [`GraphError::LinkConflict`].
    pub fn link(
        &self,
        kind: Option<LinkKind>,
        target: Uid,
        comment: Option<String>,
        quote: Option<String>,
        rate: Option<f32>,
    ) -> Result<Link> {
        let target_uri = target.uri();
        let _edit = self.entry.edit_guard();

        if let Some(existing) = self.entry.link_to(&target_uri) {
            let superseding_child = existing.is_child() && kind.is_some_and(LinkKind::is_child);
            if let Some(existing_kind) = existing.kind {
                if !superseding_child {
                    return Err(GraphError::LinkConflict {
                        uri: target_uri,
                        existing: existing_kind,
                    });
                }
            }
        }

        let link = self.inner.store.save_link(LinkDraft {
            from: Uid::Topic(self.entry.topic().clone()),
            to: target,
            kind,
            comment,
            quote,
            rate,
        })?;

        if let Uid::Topic(counterpart) = &link.to {
            if let Some(other) = self.inner.registry.read().get(&counterpart.uri()) {
                if !Arc::ptr_eq(&other, &self.entry) {
                    other.register(self.entry.uri().to_string(), link.clone());
                }
            }
        }
        self.entry.register(target_uri, link.clone());

        debug!(id = link.id, from = %self.entry.uri(), to = %link.to.uri(), "link created");
        Ok(link)
    }

    /// Finds or creates a topic named `name` and links it as a child.
    pub fn add_child(&self, name: &str) -> Result<Link> {
        let child = self.inner.find_or_create_entry(name)?;
        self.link(
            Some(LinkKind::Child),
            Uid::Topic(child.topic().clone()),
            None,
            None,
            None,
        )
    }

    /// Removes the relation to the topic named `name`, on both sides of
    /// the adjacency, and deletes the link record from the store.
    pub fn unlink(&self, name: &str) -> Result<()> {
        let target = self
            .inner
            .registry
            .read()
            .get_by_name(name)
            .ok_or_else(|| GraphError::TopicNotFound(name.to_string()))?;

        let _edit = self.entry.edit_guard();
        let link = self
            .entry
            .unregister(target.uri())
            .ok_or_else(|| GraphError::NothingToUnlink {
                uri: target.uri().to_string(),
            })?;
        target.unregister(self.entry.uri());

        self.inner.store.remove_link(link.id)?;
        debug!(id = link.id, from = %self.entry.uri(), to = %target.uri(), "link removed");
        Ok(())
    }

    /// Removes this topic from the store and the registry.
    ///
    /// Links referencing the topic are not cascade-deleted; the index
    /// build skips them (see the registry module).
    pub fn delete(self) -> Result<()> {
        self.inner.store.remove_topic(self.entry.uri())?;
        self.inner.registry.write().remove(self.entry.uri());
        info!(uri = %self.entry.uri(), "topic deleted");
        Ok(())
    }

    /// Duplicates every relation of this topic onto the topic named
    /// `into_name`, then reloads the index and returns the target's
    /// fresh handle.
    ///
    /// Merge is additive: the original links stay in the store and this
    /// topic stays registered. Callers wanting rename semantics delete
    /// the source topic afterwards.
    pub fn merge(&self, into_name: &str) -> Result<TopicHandle<S>> {
        let target = self.inner.find_or_create_entry(into_name)?;
        let target_topic = target.topic().clone();
        let own_uri = self.entry.uri().to_string();

        let _edit = self.entry.edit_guard();
        for (_, link) in self.entry.links_snapshot() {
            let from = if link.from.uri() == own_uri {
                Uid::Topic(target_topic.clone())
            } else {
                link.from
            };
            let to = if link.to.uri() == own_uri {
                Uid::Topic(target_topic.clone())
            } else {
                link.to
            };
            self.inner.store.save_link(LinkDraft {
                from,
                to,
                kind: link.kind,
                comment: link.comment,
                quote: link.quote,
                rate: link.rate,
            })?;
        }
        drop(_edit);

        info!(from = %own_uri, into = %target_topic.uri(), "topics merged");
        self.inner.reload()?;

        let entry = self
            .inner
            .registry
            .read()
            .get(&target_topic.uri())
            .ok_or_else(|| GraphError::TopicNotFound(target_topic.uri()))?;
        Ok(TopicHandle::new(self.inner.clone(), entry))
    }
}

/// A resource paired with the link attaching it, for presentation of
/// the link's comment, quote, and rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedResource {
    pub resource: Uid,
    pub link: Link,
}

/// Resources attached to a topic, partitioned by kind. The partitions
/// are disjoint: each adjacency entry lands in exactly one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicResources {
    pub video: Vec<AttachedResource>,
    pub item: Vec<AttachedResource>,
    pub items_range: Vec<AttachedResource>,
    pub document: Vec<AttachedResource>,
}

impl TopicResources {
    pub fn is_empty(&self) -> bool {
        self.video.is_empty()
            && self.item.is_empty()
            && self.items_range.is_empty()
            && self.document.is_empty()
    }

    pub fn len(&self) -> usize {
        self.video.len() + self.item.len() + self.items_range.len() + self.document.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::TopicService;
    use crate::store::{MemoryStore, TopicStore};
    use trellis_core::{Document, Item, ItemsRange, VideoResource};

    fn service() -> TopicService<MemoryStore> {
        TopicService::open(MemoryStore::new()).unwrap()
    }

    fn names<S: TopicStore>(handles: &[TopicHandle<S>]) -> Vec<&str> {
        handles.iter().map(|h| h.name()).collect()
    }

    #[test]
    fn test_child_link_shows_in_children_and_parents() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        service.find_or_create("Beta").unwrap();
        alpha.add_child("Beta").unwrap();

        assert_eq!(names(&alpha.children()), ["Beta"]);
        assert!(alpha.parents().is_empty());
        assert!(alpha.related().is_empty());

        let beta = service.get("topic/Beta").unwrap();
        assert_eq!(names(&beta.parents()), ["Alpha"]);
        assert!(beta.children().is_empty());
    }

    #[test]
    fn test_add_child_creates_missing_topic() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();
        assert!(service.has_topic("Beta"));
    }

    #[test]
    fn test_untyped_link_is_related_both_ways() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        let beta = service.find_or_create("Beta").unwrap();
        alpha
            .link(None, Uid::Topic(beta.topic().clone()), None, None, None)
            .unwrap();

        assert_eq!(names(&alpha.related()), ["Beta"]);
        assert_eq!(names(&beta.related()), ["Alpha"]);
        assert!(alpha.children().is_empty());
        assert!(beta.parents().is_empty());
    }

    #[test]
    fn test_child_link_is_idempotent() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();
        alpha.add_child("Beta").unwrap();
        assert_eq!(names(&alpha.children()), ["Beta"]);
    }

    #[test]
    fn test_exclusive_kind_conflicts_and_does_not_persist() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        let x = Uid::Document(Document::new("doc-x"));

        alpha
            .link(
                Some(LinkKind::Child),
                x.clone(),
                Some("c1".into()),
                None,
                None,
            )
            .unwrap();
        let before = service.inner.store.load_links().unwrap().len();

        let err = alpha
            .link(
                Some(LinkKind::Rating),
                x.clone(),
                Some("c2".into()),
                None,
                Some(5.0),
            )
            .unwrap_err();
        assert!(matches!(err, GraphError::LinkConflict { .. }));
        assert_eq!(service.inner.store.load_links().unwrap().len(), before);

        // And the other way round: an exclusive kind blocks everything.
        let y = Uid::Document(Document::new("doc-y"));
        alpha
            .link(Some(LinkKind::Rating), y.clone(), None, None, None)
            .unwrap();
        let err = alpha
            .link(Some(LinkKind::Reference), y, None, None, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::LinkConflict { .. }));
    }

    #[test]
    fn test_untyped_link_can_be_superseded() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        let doc = Uid::Document(Document::new("d1"));

        alpha.link(None, doc.clone(), None, None, None).unwrap();
        alpha
            .link(Some(LinkKind::Rating), doc, None, None, Some(3.0))
            .unwrap();

        let resources = alpha.resources();
        assert_eq!(resources.document.len(), 1);
        assert_eq!(resources.document[0].link.kind, Some(LinkKind::Rating));
    }

    #[test]
    fn test_unlink_removes_both_sides() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();
        let beta = service.get("topic/Beta").unwrap();

        alpha.unlink("Beta").unwrap();

        assert!(alpha.children().is_empty());
        assert!(beta.parents().is_empty());
        assert_eq!(service.stats().links, 0);
        assert!(service.inner.store.load_links().unwrap().is_empty());
    }

    #[test]
    fn test_unlink_unknown_relation_fails() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        service.find_or_create("Beta").unwrap();

        let err = alpha.unlink("Beta").unwrap_err();
        assert!(matches!(err, GraphError::NothingToUnlink { .. }));

        let err = alpha.unlink("Nowhere").unwrap_err();
        assert!(matches!(err, GraphError::TopicNotFound(_)));
    }

    #[test]
    fn test_resources_partitions_are_disjoint() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();
        alpha
            .link(None, Uid::Item(Item::new("1.0001")), None, None, None)
            .unwrap();
        alpha
            .link(
                Some(LinkKind::Rating),
                Uid::Video(VideoResource::new("v1")),
                None,
                None,
                Some(5.0),
            )
            .unwrap();
        alpha
            .link(
                None,
                Uid::ItemsRange(ItemsRange::new("1.0001-1.0009")),
                None,
                None,
                None,
            )
            .unwrap();
        alpha
            .link(
                Some(LinkKind::Reference),
                Uid::Document(Document::new("d1")),
                Some("see also".into()),
                None,
                None,
            )
            .unwrap();

        let resources = alpha.resources();
        assert_eq!(resources.len(), 4);
        assert_eq!(resources.item.len(), 1);
        assert_eq!(resources.video.len(), 1);
        assert_eq!(resources.items_range.len(), 1);
        assert_eq!(resources.document.len(), 1);
        // The topic counterpart never shows up as a resource.
        assert_eq!(resources.item[0].resource, Uid::Item(Item::new("1.0001")));
        assert_eq!(
            resources.document[0].link.comment.as_deref(),
            Some("see also")
        );
    }

    #[test]
    fn test_merge_is_additive_and_moves_resources() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        let doc = Uid::Document(Document::new("d1"));
        alpha
            .link(None, doc.clone(), Some("note".into()), None, None)
            .unwrap();
        alpha.add_child("Child").unwrap();

        let beta = alpha.merge("Beta").unwrap();
        assert_eq!(beta.name(), "Beta");

        // Every resource previously attached to Alpha is reachable
        // from Beta.
        let resources = beta.resources();
        assert_eq!(resources.document.len(), 1);
        assert_eq!(resources.document[0].resource, doc);
        assert_eq!(names(&beta.children()), ["Child"]);

        // Additive: the originals survive on Alpha.
        let alpha = service.get("topic/Alpha").unwrap();
        assert_eq!(alpha.resources().document.len(), 1);
        assert_eq!(names(&alpha.children()), ["Child"]);
    }

    #[test]
    fn test_delete_leaves_dangling_links_tolerated_by_reload() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();

        service.get("topic/Beta").unwrap().delete().unwrap();
        assert!(service.get("topic/Beta").is_none());

        // The link record is still in the store; reload skips it.
        service.reload().unwrap();
        let alpha = service.get("topic/Alpha").unwrap();
        assert!(alpha.children().is_empty());
        assert!(service.get("topic/Beta").is_none());
    }

    #[test]
    fn test_traversal_returns_registered_handles() {
        let service = service();
        let alpha = service.find_or_create("Alpha").unwrap();
        alpha.add_child("Beta").unwrap();

        let beta = &alpha.children()[0];
        beta.link(None, Uid::Item(Item::new("2.0001")), None, None, None)
            .unwrap();

        // The mutation went through the canonical entry, so a direct
        // lookup sees it.
        let beta = service.get("topic/Beta").unwrap();
        assert_eq!(beta.resources().item.len(), 1);
    }
}
