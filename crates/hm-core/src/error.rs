//! Error types for graph mutation and document decoding.

use crate::id::NodeId;

/// Broad error category, used by presentation to pick a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A node record or operation argument was rejected.
    Validation,
    /// An operation referenced a node or connection that does not exist.
    NotFound,
    /// A persisted document has the wrong overall structure.
    Format,
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("a node with id `{0}` already exists")]
    DuplicateId(NodeId),

    #[error("malformed node record: {0}")]
    InvalidRecord(String),

    #[error("no node with id `{0}`")]
    NodeNotFound(NodeId),

    #[error("no connection between `{from}` and `{to}`")]
    ConnectionNotFound { from: NodeId, to: NodeId },

    #[error("invalid file format: {0}")]
    Format(String),
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::DuplicateId(_) | MapError::InvalidRecord(_) => ErrorKind::Validation,
            MapError::NodeNotFound(_) | MapError::ConnectionNotFound { .. } => ErrorKind::NotFound,
            MapError::Format(_) => ErrorKind::Format,
        }
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Format(err.to_string())
    }
}
