//! Trellis Graph - Topic graph index and navigation
//!
//! This crate builds an in-memory index over persisted topics and
//! links and exposes navigation and mutation on top of it. The
//! [`TopicService`] owns the index lifecycle (open, reload); each
//! registered topic is reached through a [`TopicHandle`] offering
//! traversal (children/parents/related), mutation (link/unlink/
//! merge/delete), and resource aggregation.
//!
//! # Architecture
//!
//! The index is rebuilt from scratch on open and on reload: one pass
//! materializes every topic, a second parallel pass distributes every
//! link into the adjacency of each topic endpoint it touches.
//! Mutations write through to the backing [`TopicStore`] and then
//! update the in-memory adjacency.
//!
//! # Example
//!
//! ```
//! use trellis_graph::{MemoryStore, TopicService};
//!
//! let service = TopicService::open(MemoryStore::new())?;
//! let physics = service.find_or_create("Physics")?;
//! physics.add_child("Optics")?;
//!
//! let children = physics.children();
//! assert_eq!(children[0].name(), "Optics");
//! # Ok::<(), trellis_graph::GraphError>(())
//! ```

mod error;
mod registry;
mod service;
mod store;
mod topic;

pub use error::{GraphError, Result, StoreError};
pub use service::{GraphStats, TopicService};
pub use store::{MemoryStore, SledStore, TopicStore};
pub use topic::{AttachedResource, TopicHandle, TopicResources};
