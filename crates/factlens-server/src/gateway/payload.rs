//! Request/response wire types and the uniform response envelope.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use factlens::{ArticleCheckReport, ArticleMetadata, FactCheckResult, IndexStats};

/// Per-request context: fresh id and a processing-time clock.
#[derive(Debug, Clone)]
pub struct RequestContext {
    started: Instant,
    request_id: Uuid,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            request_id: Uuid::new_v4(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Snapshots the meta block for the response.
    pub fn meta(&self) -> ResponseMeta {
        ResponseMeta {
            timestamp: Utc::now(),
            request_id: self.request_id,
            processing_time: self.started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Meta block carried by every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    /// Fresh unique token per request.
    pub request_id: Uuid,
    /// Milliseconds spent handling the request.
    pub processing_time: u64,
}

/// Structured error body. The UI never receives a raw exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: ResponseMeta,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, meta: ResponseMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }

    pub fn err(error: ErrorBody, meta: ResponseMeta) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta,
        }
    }
}

/// Fact-check request: exactly one of `claim`/`text` is expected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheckRequest {
    #[serde(default)]
    pub claim: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub article_id: Option<String>,
}

/// Fact-check payload: a single-claim result or a per-claim report.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FactCheckData {
    Claim(FactCheckResult),
    Report(ArticleCheckReport),
}

/// Semantic search request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Declarative search filters (all optional, all conjoined).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub min_credibility: Option<f64>,
}

/// One article in a search response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArticle {
    pub id: String,
    #[serde(flatten)]
    pub metadata: ArticleMetadata,
}

/// Search response; `relevance_scores[i]` corresponds to `articles[i]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub articles: Vec<SearchArticle>,
    pub total_count: usize,
    pub query: String,
    /// Milliseconds spent on the search itself.
    pub processing_time: u64,
    pub relevance_scores: Vec<f32>,
}

/// Embedding request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRequest {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Embedding response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    pub model: String,
    pub usage: UsageData,
}

/// Token usage block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageData {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// Index statistics payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub total_vectors: u64,
    pub dimension: usize,
    pub index_fullness: f32,
}

impl From<IndexStats> for StatsData {
    fn from(stats: IndexStats) -> Self {
        Self {
            total_vectors: stats.total_vectors,
            dimension: stats.dimension,
            index_fullness: stats.index_fullness,
        }
    }
}
