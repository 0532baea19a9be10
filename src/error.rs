//! Error types for Spatiq operations.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SpatiqError>;

/// All errors that Spatiq operations can produce.
#[derive(Debug, Error)]
pub enum SpatiqError {
    #[error(transparent)]
    Bounds(#[from] spatiq_types::BoundsError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("pattern declares no variables")]
    EmptyPattern,

    #[error("pattern constraint references undeclared variable '{0}'")]
    UnknownVariable(String),

    #[error("domain chunk {index} failed: {source}")]
    ChunkFailed {
        index: usize,
        #[source]
        source: Box<SpatiqError>,
    },

    #[error("domains are not disjoint: key {0} appears in both operands")]
    KeyCollision(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "snapshot")]
    #[error("snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("snapshot file corrupted: {0}")]
    Corrupted(String),

    #[error("{0}")]
    Other(String),
}
