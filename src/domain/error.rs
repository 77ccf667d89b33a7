//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent tree contract violations and rejected moves.
///
/// All of them are recoverable: the tree passed in is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("cannot move {drag_key} into its own subtree (drop target {drop_key})")]
    CyclicMove { drag_key: String, drop_key: String },

    #[error("duplicate node key: {0}")]
    DuplicateKey(String),

    #[error("node with empty key")]
    EmptyKey,

    #[error("move #{index} failed: {source}")]
    BatchMoveFailed {
        index: usize,
        #[source]
        source: Box<DomainError>,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
