//! Embedding generation and vector similarity.
//!
//! The engine validates text, delegates to the active provider, and keeps
//! batch results in input order. Suitability is a pre-filter: callers must
//! not embed text that fails [`is_suitable`].

pub mod error;


pub use error::EmbeddingError;

use std::sync::Arc;

use crate::article::Article;
use crate::provider::{LanguageModel, ModelRouter, TokenUsage};

/// Upstream calls carry at most this many inputs; larger batches are
/// split into same-order chunks.
pub const EMBED_BATCH_LIMIT: usize = 100;

/// Minimum cleaned length accepted for embedding.
pub const MIN_TEXT_LEN: usize = 10;
/// Maximum cleaned length accepted for embedding.
pub const MAX_TEXT_LEN: usize = 8000;
/// Minimum word count accepted for embedding.
pub const MIN_WORD_COUNT: usize = 3;
/// Minimum ratio of alphabetic characters in cleaned text.
pub const MIN_ALPHA_RATIO: f64 = 0.5;

/// Turns text into vectors via the router's active provider.
pub struct EmbeddingEngine {
    router: Arc<ModelRouter>,
}

impl EmbeddingEngine {
    /// Creates an engine over `router`.
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    /// Embeds one text, validating suitability first.
    pub async fn embed(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_with_usage(text, model).await?.0)
    }

    /// Embeds one text and reports provider token usage.
    pub async fn embed_with_usage(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<(Vec<f32>, TokenUsage), EmbeddingError> {
        if let Some(reason) = unsuitable_reason(text) {
            return Err(EmbeddingError::UnsuitableText {
                reason: reason.to_string(),
            });
        }

        let texts = [text.to_string()];
        let (vectors, usage) = self.embed_unchecked(&texts, model).await?;
        let vector = vectors.into_iter().next().unwrap_or_default();
        Ok((vector, usage))
    }

    /// Embeds many texts, preserving input order.
    ///
    /// Validation failure of any item, or provider failure of any
    /// sub-batch, fails the whole call; there is no partial-success mode.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        for (i, text) in texts.iter().enumerate() {
            if let Some(reason) = unsuitable_reason(text) {
                return Err(EmbeddingError::UnsuitableText {
                    reason: format!("item {}: {}", i, reason),
                });
            }
        }

        Ok(self.embed_unchecked(texts, model).await?.0)
    }

    /// Embeds an article's title + summary + truncated content.
    ///
    /// Uses [`Article::embedding_input`] verbatim; the concatenation is
    /// what gets stored as the record's document text, so consistency
    /// across re-indexing depends on it.
    pub async fn embed_article(&self, article: &Article) -> Result<Vec<f32>, EmbeddingError> {
        let texts = [article.embedding_input()];
        let (vectors, _) = self.embed_unchecked(&texts, None).await?;
        Ok(vectors.into_iter().next().unwrap_or_default())
    }

    /// Splits into [`EMBED_BATCH_LIMIT`]-sized chunks and concatenates
    /// results without reordering. Sub-batches run sequentially; order is
    /// positional, not completion-based.
    async fn embed_unchecked(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<(Vec<Vec<f32>>, TokenUsage), EmbeddingError> {
        let provider = self.router.active().await?;

        let mut vectors = Vec::with_capacity(texts.len());
        let mut usage = TokenUsage::default();

        for chunk in texts.chunks(EMBED_BATCH_LIMIT) {
            let batch = provider.embed_batch(chunk, model).await?;
            usage.prompt_tokens += batch.usage.prompt_tokens;
            usage.total_tokens += batch.usage.total_tokens;
            vectors.extend(batch.vectors);
        }

        Ok((vectors, usage))
    }
}

/// Cosine similarity of two equal-length vectors.
///
/// Fails with [`EmbeddingError::DimensionMismatch`] on unequal lengths.
/// Zero-norm input yields `0.0`, not `NaN` and not an error.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(cosine_similarity(a, b))
}

/// Cosine similarity without the dimension check; mismatched or zero-norm
/// input yields `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Whether `text` is acceptable input for the embedding model.
pub fn is_suitable(text: &str) -> bool {
    unsuitable_reason(text).is_none()
}

/// Basic punctuation preserved by cleaning.
const BASIC_PUNCTUATION: &str = ".,!?;:'\"()-";

fn unsuitable_reason(text: &str) -> Option<&'static str> {
    let cleaned = clean_text(text);

    let len = cleaned.chars().count();
    if len < MIN_TEXT_LEN {
        return Some("too short");
    }
    if len > MAX_TEXT_LEN {
        return Some("too long");
    }

    if cleaned.split_whitespace().count() < MIN_WORD_COUNT {
        return Some("too few words");
    }

    let alpha = cleaned.chars().filter(|c| c.is_alphabetic()).count();
    if (alpha as f64) / (len as f64) < MIN_ALPHA_RATIO {
        return Some("mostly non-alphabetic");
    }

    None
}

/// Lower-cases, strips everything but alphanumerics, whitespace and basic
/// punctuation, and collapses whitespace runs to single spaces.
fn clean_text(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || BASIC_PUNCTUATION.contains(*c))
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}
