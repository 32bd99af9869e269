//! Identifiable entities.
//!
//! The graph connects a heterogeneous set of content entities. Topics are
//! the only kind with full navigation; the rest are leaf attachments
//! ("resources") hanging off topics.

use crate::error::UriError;
use crate::uri::{self, EntityKind};
use serde::{Deserialize, Serialize};

/// A named topic node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The canonical URI, derived from the name.
    pub fn uri(&self) -> String {
        uri::generate(EntityKind::Topic, &self.name)
    }
}

/// A single numbered content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub number: String,
}

impl Item {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }
}

/// A contiguous range of items, addressed by its range code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemsRange {
    pub code: String,
}

impl ItemsRange {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// A document resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub code: String,
}

impl Document {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// A video resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoResource {
    pub code: String,
}

impl VideoResource {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// An identifiable entity of any kind.
///
/// The variant set is fixed; dispatch on kind is ordinary pattern
/// matching. Each variant derives its URI from its kind prefix and
/// stable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Uid {
    Topic(Topic),
    Item(Item),
    ItemsRange(ItemsRange),
    Document(Document),
    Video(VideoResource),
}

impl Uid {
    /// The kind tag of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Topic(_) => EntityKind::Topic,
            Self::Item(_) => EntityKind::Item,
            Self::ItemsRange(_) => EntityKind::ItemsRange,
            Self::Document(_) => EntityKind::Document,
            Self::Video(_) => EntityKind::Video,
        }
    }

    /// The stable key the URI is derived from.
    pub fn key(&self) -> &str {
        match self {
            Self::Topic(t) => &t.name,
            Self::Item(i) => &i.number,
            Self::ItemsRange(r) => &r.code,
            Self::Document(d) => &d.code,
            Self::Video(v) => &v.code,
        }
    }

    /// The canonical URI for this entity.
    pub fn uri(&self) -> String {
        uri::generate(self.kind(), self.key())
    }

    pub fn is_topic(&self) -> bool {
        matches!(self, Self::Topic(_))
    }

    pub fn as_topic(&self) -> Option<&Topic> {
        match self {
            Self::Topic(t) => Some(t),
            _ => None,
        }
    }

    /// Reconstructs an entity from its canonical URI.
    pub fn from_uri(s: &str) -> Result<Self, UriError> {
        let (kind, key) = uri::parse(s)?;
        Ok(match kind {
            EntityKind::Topic => Self::Topic(Topic::new(key)),
            EntityKind::Item => Self::Item(Item::new(key)),
            EntityKind::ItemsRange => Self::ItemsRange(ItemsRange::new(key)),
            EntityKind::Document => Self::Document(Document::new(key)),
            EntityKind::Video => Self::Video(VideoResource::new(key)),
        })
    }
}
