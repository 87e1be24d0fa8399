use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
/// Errors returned by the embedding engine.
pub enum EmbeddingError {
    /// Caller-supplied text failed the suitability predicate.
    #[error("text is not suitable for embedding: {reason}")]
    UnsuitableText {
        /// Which check failed.
        reason: String,
    },

    /// Similarity computed over vectors of different length. Always a
    /// programming or data error, never expected in normal operation.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length of the first vector.
        expected: usize,
        /// Length of the second vector.
        actual: usize,
    },

    /// Upstream provider call failed or returned an invalid payload.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
