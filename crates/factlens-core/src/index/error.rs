use thiserror::Error;

use crate::filter::FilterError;

#[derive(Debug, Error)]
/// Errors returned by vector index operations.
pub enum IndexError {
    /// Could not connect to the Qdrant endpoint.
    #[error("failed to connect to Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection creation failed.
    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Creation raced another caller that won; resolved by re-fetching.
    #[error("collection '{collection}' already exists")]
    CollectionAlreadyExists {
        /// Collection name.
        collection: String,
    },

    /// Collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name.
        collection: String,
    },

    /// Upsert failed.
    #[error("failed to upsert records to '{collection}': {message}")]
    UpsertFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Similarity query failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Point lookup failed.
    #[error("failed to fetch record from '{collection}': {message}")]
    LookupFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Delete failed.
    #[error("failed to delete records from '{collection}': {message}")]
    DeleteFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Stats retrieval failed.
    #[error("failed to read stats for '{collection}': {message}")]
    StatsFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Record embedding has the wrong dimension for the collection.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Filter did not compile.
    #[error(transparent)]
    Filter(#[from] FilterError),
}
