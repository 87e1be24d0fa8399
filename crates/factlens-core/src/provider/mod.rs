//! Language-model providers and the preference-then-fallback router.
//!
//! Each provider speaks one upstream API (embeddings + completions) over
//! `reqwest` with typed wire structs. [`ModelRouter`] selects exactly one
//! active backend per process.

pub mod error;
pub mod gemini;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::ProviderError;
pub use gemini::GeminiProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use router::ModelRouter;

use crate::config::ProviderKind;

/// Token accounting reported by an embedding call.
///
/// Zeroed for backends that do not report usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// Result of one upstream embedding call: vectors in input order.
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub vectors: Vec<Vec<f32>>,
    pub usage: TokenUsage,
}

/// Minimal async interface implemented by every backend.
pub trait LanguageModel: Send + Sync {
    /// Which backend this is (for logs and error messages).
    fn kind(&self) -> ProviderKind;

    /// Embeds a batch of texts, preserving input order.
    ///
    /// `model` overrides the configured embedding model for this call.
    fn embed_batch(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> impl std::future::Future<Output = Result<EmbeddingBatch, ProviderError>> + Send;

    /// Generates a free-form text completion for `prompt`.
    fn complete(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Clone, Debug)]
/// Active language-model backend (real or mock).
pub enum ProviderBackend {
    /// OpenAI embeddings + chat completions.
    OpenAi(OpenAiProvider),
    /// Google Generative Language API.
    Gemini(GeminiProvider),
    #[cfg(any(test, feature = "mock"))]
    /// Scripted in-memory backend.
    Mock(std::sync::Arc<MockProvider>),
}

impl LanguageModel for ProviderBackend {
    fn kind(&self) -> ProviderKind {
        match self {
            ProviderBackend::OpenAi(p) => p.kind(),
            ProviderBackend::Gemini(p) => p.kind(),
            #[cfg(any(test, feature = "mock"))]
            ProviderBackend::Mock(p) => p.kind(),
        }
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<EmbeddingBatch, ProviderError> {
        match self {
            ProviderBackend::OpenAi(p) => p.embed_batch(texts, model).await,
            ProviderBackend::Gemini(p) => p.embed_batch(texts, model).await,
            #[cfg(any(test, feature = "mock"))]
            ProviderBackend::Mock(p) => p.embed_batch(texts, model).await,
        }
    }

    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        match self {
            ProviderBackend::OpenAi(p) => p.complete(prompt, model).await,
            ProviderBackend::Gemini(p) => p.complete(prompt, model).await,
            #[cfg(any(test, feature = "mock"))]
            ProviderBackend::Mock(p) => p.complete(prompt, model).await,
        }
    }
}
