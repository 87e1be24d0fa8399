//! Payload mapping between [`IndexedRecord`] and Qdrant point payloads.
//!
//! Filterable fields are stored as flat payload keys (see
//! [`crate::filter`]); `published_at` as unix seconds so range conditions
//! apply, `tags` as a JSON-serialized string for backend compatibility.
//! Tag deserialization failure degrades to an empty set rather than
//! failing the read.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ScoredPoint, Value};
use tracing::warn;

use crate::article::{ArticleMetadata, IndexedRecord};
use crate::filter::{
    FIELD_CATEGORY, FIELD_CREDIBILITY, FIELD_LANGUAGE, FIELD_PUBLISHED_AT, FIELD_SOURCE,
};

/// Payload key for the string article id.
pub const FIELD_ARTICLE_ID: &str = "article_id";
const FIELD_TITLE: &str = "title";
const FIELD_SUMMARY: &str = "summary";
const FIELD_URL: &str = "url";
const FIELD_AUTHOR: &str = "author";
const FIELD_TAGS: &str = "tags";
const FIELD_IMAGE_URL: &str = "image_url";
const FIELD_DOCUMENT_TEXT: &str = "document_text";

/// One similarity query hit.
///
/// `score` is Qdrant's cosine similarity: higher means more similar, and
/// the value lives in `[-1, 1]`; it is not re-normalized to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    /// Stable article id.
    pub id: String,
    /// Cosine similarity of the query against the stored vector.
    pub score: f32,
    /// Payload metadata.
    pub metadata: ArticleMetadata,
    /// The text that was embedded for this record.
    pub document_text: String,
}

/// Collection statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    /// Number of stored vectors.
    pub total_vectors: u64,
    /// Configured embedding dimension.
    pub dimension: usize,
    /// Constant `0.0`: Qdrant has no capacity ceiling to fill.
    pub index_fullness: f32,
}

/// Builds the Qdrant payload for a record.
pub fn record_payload(record: &IndexedRecord) -> HashMap<String, Value> {
    let meta = &record.metadata;
    let mut payload: HashMap<String, Value> = HashMap::new();

    payload.insert(FIELD_ARTICLE_ID.to_string(), record.id.clone().into());
    payload.insert(FIELD_TITLE.to_string(), meta.title.clone().into());
    if let Some(summary) = &meta.summary {
        payload.insert(FIELD_SUMMARY.to_string(), summary.clone().into());
    }
    payload.insert(FIELD_URL.to_string(), meta.url.clone().into());
    payload.insert(FIELD_SOURCE.to_string(), meta.source.clone().into());
    if let Some(author) = &meta.author {
        payload.insert(FIELD_AUTHOR.to_string(), author.clone().into());
    }
    payload.insert(
        FIELD_PUBLISHED_AT.to_string(),
        meta.published_at.timestamp().into(),
    );
    payload.insert(FIELD_CATEGORY.to_string(), meta.category.clone().into());
    payload.insert(FIELD_TAGS.to_string(), serialize_tags(&meta.tags).into());
    payload.insert(
        FIELD_CREDIBILITY.to_string(),
        meta.credibility_score.into(),
    );
    if let Some(image_url) = &meta.image_url {
        payload.insert(FIELD_IMAGE_URL.to_string(), image_url.clone().into());
    }
    payload.insert(FIELD_LANGUAGE.to_string(), meta.language.clone().into());
    payload.insert(
        FIELD_DOCUMENT_TEXT.to_string(),
        record.document_text.clone().into(),
    );

    payload
}

/// Serializes tags to the JSON string stored in the payload.
pub fn serialize_tags(tags: &BTreeSet<String>) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Deserializes the stored tag string, degrading to the empty set.
pub fn deserialize_tags(raw: Option<&str>) -> BTreeSet<String> {
    let Some(raw) = raw else {
        return BTreeSet::new();
    };

    match serde_json::from_str(raw) {
        Ok(tags) => tags,
        Err(e) => {
            warn!(error = %e, "Malformed tag payload, treating as empty");
            BTreeSet::new()
        }
    }
}

/// Reads metadata back out of a payload.
///
/// Missing scalar fields default to empty strings/zeroes; this only
/// happens when the collection holds records written by an incompatible
/// writer.
pub fn metadata_from_payload(payload: &HashMap<String, Value>) -> ArticleMetadata {
    ArticleMetadata {
        title: payload_str(payload, FIELD_TITLE).unwrap_or_default(),
        summary: payload_str(payload, FIELD_SUMMARY),
        url: payload_str(payload, FIELD_URL).unwrap_or_default(),
        source: payload_str(payload, FIELD_SOURCE).unwrap_or_default(),
        author: payload_str(payload, FIELD_AUTHOR),
        published_at: payload
            .get(FIELD_PUBLISHED_AT)
            .and_then(|v| v.as_integer())
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).expect("epoch is valid")),
        category: payload_str(payload, FIELD_CATEGORY).unwrap_or_default(),
        tags: deserialize_tags(payload_str(payload, FIELD_TAGS).as_deref()),
        credibility_score: payload
            .get(FIELD_CREDIBILITY)
            .and_then(value_as_f64)
            .unwrap_or(0.0),
        image_url: payload_str(payload, FIELD_IMAGE_URL),
        language: payload_str(payload, FIELD_LANGUAGE).unwrap_or_default(),
    }
}

/// Reads the article id out of a payload.
pub fn article_id_from_payload(payload: &HashMap<String, Value>) -> Option<String> {
    payload_str(payload, FIELD_ARTICLE_ID)
}

/// Reads the embedded document text out of a payload.
pub fn document_text_from_payload(payload: &HashMap<String, Value>) -> String {
    payload_str(payload, FIELD_DOCUMENT_TEXT).unwrap_or_default()
}

/// Converts a scored point to a [`QueryMatch`].
///
/// Points without a readable article id are skipped (foreign writers).
pub fn query_match_from_scored_point(point: ScoredPoint) -> Option<QueryMatch> {
    let payload = point.payload;
    let id = article_id_from_payload(&payload)?;

    Some(QueryMatch {
        id,
        score: point.score,
        metadata: metadata_from_payload(&payload),
        document_text: document_text_from_payload(&payload),
    })
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value.kind.as_ref()? {
        Kind::DoubleValue(d) => Some(*d),
        Kind::IntegerValue(i) => Some(*i as f64),
        _ => None,
    }
}
