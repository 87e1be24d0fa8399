use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;
use crate::provider::ProviderError;

#[derive(Debug, Error)]
/// Errors that abort a fact-check call.
///
/// Verdict synthesis failures never appear here: that step recovers
/// locally to the fixed fallback result.
pub enum FactCheckError {
    /// Claim text failed validation before any network call.
    #[error("claim cannot be checked: {reason}")]
    InvalidClaim {
        /// Which check failed.
        reason: String,
    },

    /// Embedding the claim failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Provider call outside of verdict synthesis failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Evidence retrieval failed.
    #[error(transparent)]
    Index(#[from] IndexError),
}
