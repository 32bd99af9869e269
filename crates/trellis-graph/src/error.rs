use thiserror::Error;
use trellis_core::LinkKind;

/// Errors from the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Errors surfaced by graph operations.
///
/// All operations fail fast; store failures are propagated untouched
/// (retry policy, if any, belongs to the caller).
#[derive(Debug, Error)]
pub enum GraphError {
    /// A typed link to the counterpart already exists and the new link
    /// may not supersede it.
    #[error("link to {uri} already exists with kind: {existing}")]
    LinkConflict { uri: String, existing: LinkKind },

    /// Unlink of a relation that is not in the adjacency.
    #[error("no link to {uri} to remove")]
    NothingToUnlink { uri: String },

    /// A name or URI resolved to no registered topic.
    #[error("no topic registered for {0}")]
    TopicNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
