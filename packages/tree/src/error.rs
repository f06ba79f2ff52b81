use crate::node::NodeKind;
use thiserror::Error;

pub type LocationResult<T> = Result<T, LocationError>;

/// Failure to resolve a [`crate::LocationPath`]. Never clamped or retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{kind} node has no child list")]
    NotAContainer { kind: NodeKind },

    #[error("{kind} node is not a widget")]
    NotAWidget { kind: NodeKind },

    #[error("Container {index} out of range (widget has {count})")]
    BadContainerIndex { index: usize, count: usize },

    #[error("Malformed location path: {0:?}")]
    Malformed(String),
}

impl LocationError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn malformed(path: impl Into<String>) -> Self {
        Self::Malformed(path.into())
    }
}
