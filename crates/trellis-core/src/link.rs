//! Typed links between entities.
//!
//! A link is an independently persisted record connecting two
//! identifiable entities. Links are directional for child/parent
//! semantics; a link with no kind is an untyped "related" connection
//! and is treated as symmetric.

use crate::entity::Uid;
use serde::{Deserialize, Serialize};

/// The kind of a typed link.
///
/// `Child` is the hierarchy marker and the only kind that allows
/// multiple coexisting links to the same counterpart; all other kinds
/// are exclusive per (topic, counterpart) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Parent→child topic hierarchy.
    Child,

    /// A rated attachment (carries a score in the link's `rate`).
    Rating,

    /// A plain citation/reference attachment.
    Reference,
}

impl LinkKind {
    /// Whether this kind belongs to the child family.
    pub fn is_child(self) -> bool {
        matches!(self, Self::Child)
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Child => "child",
            Self::Rating => "rating",
            Self::Reference => "reference",
        };
        write!(f, "{}", s)
    }
}

/// Store-assigned link identity.
pub type LinkId = u64;

/// A persisted link record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Store-assigned id; links are removable by id.
    pub id: LinkId,

    pub from: Uid,
    pub to: Uid,

    /// `None` means an untyped "related" link.
    pub kind: Option<LinkKind>,

    pub comment: Option<String>,
    pub quote: Option<String>,
    pub rate: Option<f32>,
}

impl Link {
    /// The endpoint opposite to `uri`.
    ///
    /// For a self-loop both endpoints match and `to` is returned.
    pub fn counterpart_of(&self, uri: &str) -> &Uid {
        if self.from.uri() == uri {
            &self.to
        } else {
            &self.from
        }
    }

    /// Whether this link's kind is present and in the child family.
    pub fn is_child(&self) -> bool {
        self.kind.is_some_and(LinkKind::is_child)
    }
}

/// A link that has not been persisted yet (no id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDraft {
    pub from: Uid,
    pub to: Uid,
    pub kind: Option<LinkKind>,
    pub comment: Option<String>,
    pub quote: Option<String>,
    pub rate: Option<f32>,
}

impl LinkDraft {
    /// Creates an untyped draft between two entities.
    pub fn new(from: Uid, to: Uid) -> Self {
        Self {
            from,
            to,
            kind: None,
            comment: None,
            quote: None,
            rate: None,
        }
    }

    pub fn with_kind(mut self, kind: LinkKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Attaches a store-assigned id, producing the persisted record.
    pub fn into_link(self, id: LinkId) -> Link {
        Link {
            id,
            from: self.from,
            to: self.to,
            kind: self.kind,
            comment: self.comment,
            quote: self.quote,
            rate: self.rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Item, Topic};

    fn sample_link() -> Link {
        LinkDraft::new(
            Uid::Topic(Topic::new("Light")),
            Uid::Item(Item::new("1.0001")),
        )
        .with_kind(LinkKind::Rating)
        .with_comment("key passage")
        .with_rate(4.5)
        .into_link(7)
    }

    #[test]
    fn test_draft_builder() {
        let link = sample_link();
        assert_eq!(link.id, 7);
        assert_eq!(link.kind, Some(LinkKind::Rating));
        assert_eq!(link.comment.as_deref(), Some("key passage"));
        assert_eq!(link.quote, None);
        assert_eq!(link.rate, Some(4.5));
    }

    #[test]
    fn test_counterpart_of() {
        let link = sample_link();
        assert_eq!(link.counterpart_of("topic/Light"), &link.to);
        assert_eq!(link.counterpart_of("item/1.0001"), &link.from);
    }

    #[test]
    fn test_child_family() {
        assert!(LinkKind::Child.is_child());
        assert!(!LinkKind::Rating.is_child());
        assert!(!LinkKind::Reference.is_child());

        let mut link = sample_link();
        assert!(!link.is_child());
        link.kind = Some(LinkKind::Child);
        assert!(link.is_child());
        link.kind = None;
        assert!(!link.is_child());
    }
}
