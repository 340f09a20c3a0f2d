//! Error type for every memory tier.

use thiserror::Error;

/// Errors a [`crate::store::MemoryStore`] or [`crate::vector::VectorIndex`]
/// implementation can return.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A vector's length didn't match the index's configured dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was configured with.
        expected: usize,
        /// Dimension of the vector actually supplied.
        actual: usize,
    },

    /// Key did not exist (or was not visible to the caller's identity/scope).
    #[error("memory key not found: {0}")]
    NotFound(String),

    /// A `clear` pattern couldn't be interpreted.
    #[error("invalid clear pattern: {0}")]
    InvalidPattern(String),

    /// A backing codec (serde_json) rejected the stored payload.
    #[error("memory entry codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
