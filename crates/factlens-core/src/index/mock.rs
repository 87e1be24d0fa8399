//! In-memory index backend for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::client::IndexClient;
use super::error::IndexError;
use super::model::QueryMatch;
use crate::article::{ArticleMetadata, IndexedRecord};
use crate::embedding::cosine_similarity;
use crate::filter::{self, FilterExpression, FilterField, RangeBounds};
use crate::hashing::point_id_for_article;

#[derive(Clone, Default)]
/// Shared in-memory backend; clones see the same collections, so several
/// index instances can race against one state like real callers racing
/// one Qdrant.
pub struct MockIndexClient {
    collections: Arc<RwLock<HashMap<String, MockCollection>>>,
}

#[derive(Default)]
struct MockCollection {
    vector_size: u64,
    records: HashMap<u64, IndexedRecord>,
}

impl MockIndexClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, if the collection exists.
    pub fn record_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.records.len())
    }
}

impl IndexClient for MockIndexClient {
    async fn collection_exists(&self, name: &str) -> Result<bool, IndexError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| IndexError::LookupFailed {
                collection: name.to_string(),
                message: "lock poisoned".to_string(),
            })?;
        Ok(collections.contains_key(name))
    }

    async fn create_collection(&self, name: &str, vector_size: u64) -> Result<(), IndexError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| IndexError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        if collections.contains_key(name) {
            return Err(IndexError::CollectionAlreadyExists {
                collection: name.to_string(),
            });
        }

        collections.insert(
            name.to_string(),
            MockCollection {
                vector_size,
                records: HashMap::new(),
            },
        );

        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: Vec<IndexedRecord>,
    ) -> Result<(), IndexError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| IndexError::UpsertFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| IndexError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        for record in records {
            if record.embedding.len() as u64 != coll.vector_size {
                return Err(IndexError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: record.embedding.len(),
                });
            }

            coll.records.insert(point_id_for_article(&record.id), record);
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        filters: &[FilterExpression],
    ) -> Result<Vec<QueryMatch>, IndexError> {
        // Same validation surface as the real backend.
        filter::validate(filters)?;

        let collections = self
            .collections
            .read()
            .map_err(|_| IndexError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll = collections
            .get(collection)
            .ok_or_else(|| IndexError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        let mut results: Vec<QueryMatch> = coll
            .records
            .values()
            .filter(|record| {
                filters
                    .iter()
                    .all(|f| matches_expression(&record.metadata, f))
            })
            .map(|record| QueryMatch {
                id: record.id.clone(),
                score: cosine_similarity(&query, &record.embedding),
                metadata: record.metadata.clone(),
                document_text: record.document_text.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results.truncate(limit as usize);
        Ok(results)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<IndexedRecord>, IndexError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| IndexError::LookupFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        Ok(collections
            .get(collection)
            .and_then(|c| c.records.get(&point_id_for_article(id)))
            .cloned())
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<(), IndexError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| IndexError::DeleteFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| IndexError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        for id in ids {
            coll.records.remove(&point_id_for_article(id));
        }

        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64, IndexError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| IndexError::StatsFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        Ok(collections
            .get(collection)
            .map(|c| c.records.len() as u64)
            .unwrap_or(0))
    }
}

/// Evaluates one expression against metadata, mirroring the compiled
/// Qdrant semantics.
fn matches_expression(metadata: &ArticleMetadata, expression: &FilterExpression) -> bool {
    match expression {
        FilterExpression::Equals(field, value) => match field {
            FilterField::Source => metadata.source == *value,
            FilterField::Category => metadata.category == *value,
            FilterField::Language => metadata.language == *value,
            _ => false,
        },

        FilterExpression::In(field, values) => match field {
            FilterField::Source => values.contains(&metadata.source),
            FilterField::Category => values.contains(&metadata.category),
            _ => false,
        },

        FilterExpression::Range(field, RangeBounds { gte, lte }) => {
            let value = match field {
                FilterField::CredibilityScore => metadata.credibility_score,
                FilterField::PublishedAt => metadata.published_at.timestamp() as f64,
                _ => return false,
            };
            gte.is_none_or(|floor| value >= floor) && lte.is_none_or(|ceiling| value <= ceiling)
        }

        FilterExpression::And(children) => children
            .iter()
            .all(|child| matches_expression(metadata, child)),
    }
}
