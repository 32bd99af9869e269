//! URI generation and parsing.
//!
//! Every identifiable entity has a globally unique URI derived from its
//! kind and a stable key: `<kind-prefix>/<key>`. URIs are immutable once
//! assigned and are the canonical identity used by the graph index.

use crate::error::UriError;
use serde::{Deserialize, Serialize};

/// The kind tag of an identifiable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A named topic, the only kind with first-class graph navigation.
    Topic,

    /// A single numbered content item.
    Item,

    /// A contiguous range of items.
    ItemsRange,

    /// A document resource.
    Document,

    /// A video resource.
    Video,
}

impl EntityKind {
    /// The URI prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Item => "item",
            Self::ItemsRange => "items-range",
            Self::Document => "document",
            Self::Video => "video",
        }
    }

    /// Resolves a URI prefix back to a kind.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "topic" => Some(Self::Topic),
            "item" => Some(Self::Item),
            "items-range" => Some(Self::ItemsRange),
            "document" => Some(Self::Document),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Generates the canonical URI for a kind and key.
pub fn generate(kind: EntityKind, key: &str) -> String {
    format!("{}/{}", kind.prefix(), key)
}

/// Parses a URI back into its kind and key.
///
/// Round-trips with [`generate`]: `parse(&generate(kind, key))` yields
/// `(kind, key)` for any key.
pub fn parse(uri: &str) -> Result<(EntityKind, &str), UriError> {
    let (prefix, key) = uri
        .split_once('/')
        .ok_or_else(|| UriError::Malformed(uri.to_string()))?;
    let kind =
        EntityKind::from_prefix(prefix).ok_or_else(|| UriError::UnknownKind(prefix.to_string()))?;
    Ok((kind, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_every_kind() {
        let cases = [
            (EntityKind::Topic, "Quantum Optics"),
            (EntityKind::Item, "1.0042"),
            (EntityKind::ItemsRange, "1.0042-1.0050"),
            (EntityKind::Document, "1x9fQ3"),
            (EntityKind::Video, "dQw4w9WgXcQ"),
        ];
        for (kind, key) in cases {
            let uri = generate(kind, key);
            assert_eq!(parse(&uri).unwrap(), (kind, key));
        }
    }

    #[test]
    fn test_key_may_contain_slashes() {
        let uri = generate(EntityKind::Document, "folder/file");
        assert_eq!(parse(&uri).unwrap(), (EntityKind::Document, "folder/file"));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert_eq!(
            parse("topicPhysics"),
            Err(UriError::Malformed("topicPhysics".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        assert_eq!(
            parse("playlist/abc"),
            Err(UriError::UnknownKind("playlist".to_string()))
        );
    }
}
