//! Article vector index over Qdrant.
//!
//! [`ArticleIndex`] owns lazy, race-safe creation of its backing
//! collection and exposes upsert/query/lookup/delete/stats. Scores are
//! Qdrant's cosine similarity (higher = more similar, range `[-1, 1]`);
//! callers must not assume `[0, 1]`.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{IndexClient, QdrantIndexClient};
pub use error::IndexError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockIndexClient;
pub use model::{IndexStats, QueryMatch};

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::article::IndexedRecord;
use crate::config::Config;
use crate::filter::FilterExpression;

/// Collection settings for an [`ArticleIndex`].
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Collection name (shared by every process pointed at the backend).
    pub collection_name: String,
    /// Embedding dimension the collection is created with.
    pub vector_size: u64,
}

impl IndexConfig {
    /// Derives index settings from service config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            collection_name: config.collection_name.clone(),
            vector_size: config.embedding_dim as u64,
        }
    }
}

/// Vector index of article embeddings and metadata.
pub struct ArticleIndex<C: IndexClient> {
    client: C,
    config: IndexConfig,
    ready: OnceCell<()>,
}

impl<C: IndexClient> ArticleIndex<C> {
    /// Creates an index over `client`. The collection is resolved lazily
    /// on first use.
    pub fn new(client: C, config: IndexConfig) -> Self {
        Self {
            client,
            config,
            ready: OnceCell::new(),
        }
    }

    /// Returns the backend client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the index configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Resolves or creates the backing collection, exactly once per
    /// process.
    ///
    /// Race policy for first access across processes: fetch; on
    /// not-found, create; if creation loses to a concurrent creator,
    /// fetch again. Every caller converges on the same collection and
    /// no duplicate-creation failure escapes.
    pub async fn ensure_collection(&self) -> Result<(), IndexError> {
        self.ready
            .get_or_try_init(|| async {
                let name = &self.config.collection_name;

                if self.client.collection_exists(name).await? {
                    return Ok(());
                }

                match self
                    .client
                    .create_collection(name, self.config.vector_size)
                    .await
                {
                    Ok(()) => {
                        debug!(collection = %name, "Created vector collection");
                        Ok(())
                    }
                    Err(IndexError::CollectionAlreadyExists { .. }) => {
                        // Another caller won the race; re-fetch to confirm.
                        if self.client.collection_exists(name).await? {
                            Ok(())
                        } else {
                            Err(IndexError::CreateCollectionFailed {
                                collection: name.clone(),
                                message: "creation raced but collection is still missing"
                                    .to_string(),
                            })
                        }
                    }
                    Err(e) => Err(e),
                }
            })
            .await
            .copied()
    }

    /// Upserts one record (idempotent by id).
    pub async fn upsert(&self, record: IndexedRecord) -> Result<(), IndexError> {
        self.upsert_batch(vec![record]).await
    }

    /// Upserts many records in one backend call. No ordering guarantee
    /// on the backend side.
    pub async fn upsert_batch(&self, records: Vec<IndexedRecord>) -> Result<(), IndexError> {
        self.ensure_collection().await?;

        for record in &records {
            if record.embedding.len() as u64 != self.config.vector_size {
                return Err(IndexError::InvalidDimension {
                    expected: self.config.vector_size as usize,
                    actual: record.embedding.len(),
                });
            }
        }

        self.client
            .upsert(&self.config.collection_name, records)
            .await
    }

    /// Similarity query with optional metadata filters; results ordered
    /// by descending score.
    pub async fn query(
        &self,
        embedding: Vec<f32>,
        top_k: u64,
        filters: &[FilterExpression],
    ) -> Result<Vec<QueryMatch>, IndexError> {
        self.ensure_collection().await?;
        self.client
            .search(&self.config.collection_name, embedding, top_k, filters)
            .await
    }

    /// Query restricted to a publication window.
    pub async fn query_by_date_range(
        &self,
        embedding: Vec<f32>,
        top_k: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<QueryMatch>, IndexError> {
        let filters = [FilterExpression::published_between(from, to)];
        self.query(embedding, top_k, &filters).await
    }

    /// Query restricted to a set of sources.
    pub async fn query_by_source<I, S>(
        &self,
        embedding: Vec<f32>,
        top_k: u64,
        sources: I,
    ) -> Result<Vec<QueryMatch>, IndexError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filters = [FilterExpression::source_in(sources)];
        self.query(embedding, top_k, &filters).await
    }

    /// Query restricted to sources at or above a credibility floor.
    pub async fn query_by_min_credibility(
        &self,
        embedding: Vec<f32>,
        top_k: u64,
        floor: f64,
    ) -> Result<Vec<QueryMatch>, IndexError> {
        let filters = [FilterExpression::min_credibility(floor)];
        self.query(embedding, top_k, &filters).await
    }

    /// Fetches one record by article id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<IndexedRecord>, IndexError> {
        self.ensure_collection().await?;
        self.client.get(&self.config.collection_name, id).await
    }

    /// Deletes one record by article id.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), IndexError> {
        let ids = [id.to_string()];
        self.delete_by_ids(&ids).await
    }

    /// Deletes many records by article id.
    pub async fn delete_by_ids(&self, ids: &[String]) -> Result<(), IndexError> {
        self.ensure_collection().await?;
        self.client.delete(&self.config.collection_name, ids).await
    }

    /// Collection statistics. `index_fullness` is a constant `0.0`:
    /// the backend has no capacity ceiling.
    pub async fn stats(&self) -> Result<IndexStats, IndexError> {
        self.ensure_collection().await?;
        let total_vectors = self.client.count(&self.config.collection_name).await?;

        Ok(IndexStats {
            total_vectors,
            dimension: self.config.vector_size as usize,
            index_fullness: 0.0,
        })
    }
}
