//! Scripted in-memory provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::ProviderError;
use super::{EmbeddingBatch, LanguageModel, TokenUsage};
use crate::config::ProviderKind;
use crate::hashing::hash_to_u64;

const PROVIDER_NAME: &str = "mock";

/// Deterministic scripted backend.
///
/// Embeddings are derived from the text hash, so the same text always
/// embeds to the same vector (round-trip tests rely on this). Completions
/// are popped from a queue scripted by the test.
#[derive(Debug)]
pub struct MockProvider {
    embedding_dim: usize,
    completions: Mutex<VecDeque<String>>,
    fail_embeddings: AtomicBool,
    fail_completions: AtomicBool,
}

impl MockProvider {
    /// Creates a mock producing vectors of `embedding_dim`.
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            completions: Mutex::new(VecDeque::new()),
            fail_embeddings: AtomicBool::new(false),
            fail_completions: AtomicBool::new(false),
        }
    }

    /// Queues the next completion response.
    pub fn push_completion(&self, text: impl Into<String>) {
        self.completions
            .lock()
            .expect("mock lock poisoned")
            .push_back(text.into());
    }

    /// Makes subsequent embedding calls fail.
    pub fn fail_embeddings(&self, fail: bool) {
        self.fail_embeddings.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent completion calls fail.
    pub fn fail_completions(&self, fail: bool) {
        self.fail_completions.store(fail, Ordering::SeqCst);
    }

    /// The deterministic embedding for `text`.
    pub fn embedding_for(&self, text: &str) -> Vec<f32> {
        // xorshift over the text hash; values spread across [-1, 1].
        let mut state = hash_to_u64(text.as_bytes()) | 1;
        (0..self.embedding_dim)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state % 2000) as f32 / 1000.0) - 1.0
            })
            .collect()
    }
}

impl LanguageModel for MockProvider {
    fn kind(&self) -> ProviderKind {
        // Reported as the preferred default; tests rarely care which.
        ProviderKind::Gemini
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        _model: Option<&str>,
    ) -> Result<EmbeddingBatch, ProviderError> {
        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                message: "scripted embedding failure".to_string(),
            });
        }

        Ok(EmbeddingBatch {
            vectors: texts.iter().map(|t| self.embedding_for(t)).collect(),
            usage: TokenUsage {
                prompt_tokens: texts.len() as u32,
                total_tokens: texts.len() as u32,
            },
        })
    }

    async fn complete(
        &self,
        _prompt: &str,
        _model: Option<&str>,
    ) -> Result<String, ProviderError> {
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                message: "scripted completion failure".to_string(),
            });
        }

        self.completions
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .ok_or(ProviderError::EmptyResponse {
                provider: PROVIDER_NAME,
                what: "completion",
            })
    }
}
