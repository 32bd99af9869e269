//! Trellis Core - Entity and link model
//!
//! This crate defines the identifiable entities that participate in the
//! topic graph and the typed links that connect them. Entities are
//! addressed by URIs of the form `<kind-prefix>/<key>`, generated from
//! an entity's kind and its stable key.
//!
//! # Example
//!
//! ```
//! use trellis_core::{LinkDraft, LinkKind, Topic, Uid};
//!
//! let physics = Uid::Topic(Topic::new("Physics"));
//! let optics = Uid::Topic(Topic::new("Optics"));
//! assert_eq!(physics.uri(), "topic/Physics");
//!
//! let draft = LinkDraft::new(physics, optics).with_kind(LinkKind::Child);
//! assert_eq!(draft.kind, Some(LinkKind::Child));
//! ```

mod entity;
mod error;
mod link;
pub mod uri;

pub use entity::{Document, Item, ItemsRange, Topic, Uid, VideoResource};
pub use error::UriError;
pub use link::{Link, LinkDraft, LinkId, LinkKind};
pub use uri::EntityKind;
