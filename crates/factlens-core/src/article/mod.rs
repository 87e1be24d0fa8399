//! Article data model consumed by the pipeline.
//!
//! Articles arrive already normalized from upstream ingestion; the core
//! never fetches. [`Article::embedding_input`] defines the exact text fed
//! to the embedding model. The concatenation order and truncation must
//! stay fixed or re-indexed vectors stop being comparable to old ones.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing::article_id_from_url;

/// Article content is truncated to this many characters before embedding.
pub const EMBED_CONTENT_LIMIT: usize = 8000;

/// A normalized news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Stable id derived from the URL.
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Source trustworthiness in `[0, 1]`.
    pub credibility_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub language: String,
}

impl Article {
    /// Derives the stable id for an article at `url`.
    pub fn id_for_url(url: &str) -> String {
        article_id_from_url(url)
    }

    /// Builds the text that gets embedded for this article.
    ///
    /// Title, then summary when present, then content truncated to
    /// [`EMBED_CONTENT_LIMIT`] characters, separated by blank lines.
    pub fn embedding_input(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        parts.push(self.title.as_str());

        if let Some(summary) = &self.summary {
            parts.push(summary.as_str());
        }

        let content: String = self.content.chars().take(EMBED_CONTENT_LIMIT).collect();
        let mut input = parts.join("\n\n");
        input.push_str("\n\n");
        input.push_str(&content);
        input
    }

    /// Projects the indexable metadata (everything except full content).
    pub fn metadata(&self) -> ArticleMetadata {
        ArticleMetadata {
            title: self.title.clone(),
            summary: self.summary.clone(),
            url: self.url.clone(),
            source: self.source.clone(),
            author: self.author.clone(),
            published_at: self.published_at,
            category: self.category.clone(),
            tags: self.tags.clone(),
            credibility_score: self.credibility_score,
            image_url: self.image_url.clone(),
            language: self.language.clone(),
        }
    }
}

/// Projection of [`Article`] stored in the vector index payload.
///
/// Excludes the full content; `document_text` on the record carries the
/// embedded text instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub credibility_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub language: String,
}

/// One indexed article: embedding plus payload.
///
/// Superseded (not versioned) by later upserts with the same id.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    /// Stable article id (string form; the numeric point id is derived).
    pub id: String,
    /// Embedding of [`Article::embedding_input`].
    pub embedding: Vec<f32>,
    /// Payload metadata.
    pub metadata: ArticleMetadata,
    /// The exact text that was embedded.
    pub document_text: String,
}

impl IndexedRecord {
    /// Builds a record from an article and its embedding.
    pub fn from_article(article: &Article, embedding: Vec<f32>) -> Self {
        Self {
            id: article.id.clone(),
            embedding,
            metadata: article.metadata(),
            document_text: article.embedding_input(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_article() -> Article {
        Article {
            id: Article::id_for_url("https://example.com/news/jobs"),
            title: "Jobs report".to_string(),
            content: "The unemployment rate held at 3.5% in July.".to_string(),
            summary: Some("Unemployment steady.".to_string()),
            url: "https://example.com/news/jobs".to_string(),
            source: "Example Wire".to_string(),
            author: None,
            published_at: Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap(),
            category: "economy".to_string(),
            tags: BTreeSet::from(["economy".to_string(), "jobs".to_string()]),
            credibility_score: 0.9,
            image_url: None,
            language: "en".to_string(),
        }
    }

    #[test]
    fn embedding_input_order_is_title_summary_content() {
        let article = sample_article();
        let input = article.embedding_input();

        assert_eq!(
            input,
            "Jobs report\n\nUnemployment steady.\n\nThe unemployment rate held at 3.5% in July."
        );
    }

    #[test]
    fn embedding_input_skips_missing_summary() {
        let mut article = sample_article();
        article.summary = None;

        assert_eq!(
            article.embedding_input(),
            "Jobs report\n\nThe unemployment rate held at 3.5% in July."
        );
    }

    #[test]
    fn embedding_input_truncates_content() {
        let mut article = sample_article();
        article.content = "x".repeat(EMBED_CONTENT_LIMIT + 500);

        let input = article.embedding_input();
        let content_part = input.rsplit("\n\n").next().unwrap();
        assert_eq!(content_part.chars().count(), EMBED_CONTENT_LIMIT);
    }

    #[test]
    fn metadata_projection_excludes_content() {
        let article = sample_article();
        let metadata = article.metadata();

        assert_eq!(metadata.title, article.title);
        assert_eq!(metadata.credibility_score, article.credibility_score);
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("held at 3.5%"));
    }

    #[test]
    fn record_from_article_carries_document_text() {
        let article = sample_article();
        let record = IndexedRecord::from_article(&article, vec![0.0; 4]);

        assert_eq!(record.id, article.id);
        assert_eq!(record.document_text, article.embedding_input());
    }
}
