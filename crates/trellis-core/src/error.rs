use thiserror::Error;

/// Errors from URI parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("malformed uri: {0}")]
    Malformed(String),
    #[error("unknown entity kind prefix: {0}")]
    UnknownKind(String),
}
