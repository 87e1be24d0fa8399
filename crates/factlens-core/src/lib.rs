//! Factlens library crate (used by the server and integration tests).
//!
//! Retrieval-augmented fact-checking: embed a claim, search a Qdrant
//! collection of article vectors filtered by source credibility, and
//! synthesize a strict-schema verdict from a language model over the
//! retrieved evidence.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Service configuration
//! - [`Article`], [`ArticleMetadata`], [`IndexedRecord`] - Data model
//! - [`Verdict`], [`Evidence`], [`FactCheckResult`] - Check results
//!
//! ## Pipeline
//! - [`EmbeddingEngine`] - Text to vectors, suitability, similarity
//! - [`ModelRouter`], [`ProviderBackend`] - Provider selection
//! - [`FilterExpression`], [`filter::compile`] - Declarative filters
//! - [`ArticleIndex`], [`QdrantIndexClient`] - Vector index
//! - [`FactChecker`] - Orchestration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature =
//! "mock"))]`.

pub mod article;
pub mod config;
pub mod embedding;
pub mod factcheck;
pub mod filter;
pub mod hashing;
pub mod index;
pub mod provider;

pub use article::{Article, ArticleMetadata, EMBED_CONTENT_LIMIT, IndexedRecord};
pub use config::{
    Config, ConfigError, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_MIN_CREDIBILITY, DEFAULT_QDRANT_URL, DEFAULT_TOP_K, ProviderKind,
};
pub use embedding::{
    EMBED_BATCH_LIMIT, EmbeddingEngine, EmbeddingError, cosine_similarity, is_suitable, similarity,
};
pub use factcheck::{
    ArticleCheckReport, CLAIM_EXTRACT_LIMIT, ClaimOutcome, Evidence, FALLBACK_CONFIDENCE,
    FALLBACK_EXPLANATION, FactCheckError, FactCheckResult, FactChecker, MAX_SNIPPET_LEN,
    SynthesizedVerdict, Verdict, extract_relevant_snippet, parse_claim_list,
    parse_verdict_response,
};
pub use filter::{FilterError, FilterExpression, FilterField, RangeBounds};
pub use hashing::{article_id_from_url, hash_to_u64, point_id_for_article};
pub use index::{
    ArticleIndex, IndexClient, IndexError, IndexStats, QdrantIndexClient, QueryMatch,
};
pub use provider::{
    EmbeddingBatch, GeminiProvider, LanguageModel, ModelRouter, OpenAiProvider, ProviderBackend,
    ProviderError, TokenUsage,
};

#[cfg(any(test, feature = "mock"))]
pub use index::MockIndexClient;
#[cfg(any(test, feature = "mock"))]
pub use provider::MockProvider;

pub use index::IndexConfig;
