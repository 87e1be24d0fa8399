use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by language-model providers and the router.
pub enum ProviderError {
    /// Provider constructed without its required credential.
    #[error("provider '{provider}' is not configured: missing {variable}")]
    NotConfigured {
        /// Provider name.
        provider: &'static str,
        /// Missing environment variable.
        variable: &'static str,
    },

    /// Neither backend has credentials; fact-checking and embedding are
    /// impossible.
    #[error("no language model provider is configured")]
    NoProviderAvailable,

    /// Could not build the HTTP client for a provider.
    #[error("failed to build {provider} client: {message}")]
    ClientBuildFailed {
        /// Provider name.
        provider: &'static str,
        /// Error message.
        message: String,
    },

    /// Upstream call failed (transport error, timeout, or non-success
    /// status).
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        /// Provider name.
        provider: &'static str,
        /// Error message.
        message: String,
    },

    /// Upstream answered but the payload was empty or missing the
    /// expected field.
    #[error("{provider} returned an empty {what}")]
    EmptyResponse {
        /// Provider name.
        provider: &'static str,
        /// What was expected (e.g. "embedding", "completion").
        what: &'static str,
    },

    /// Upstream returned a different number of embeddings than inputs.
    #[error("{provider} returned {actual} embeddings for {expected} inputs")]
    EmbeddingCountMismatch {
        /// Provider name.
        provider: &'static str,
        /// Number of inputs sent.
        expected: usize,
        /// Number of embeddings received.
        actual: usize,
    },
}
