//! Qdrant-backed index client and the backend trait.

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, GetPointsBuilder, PointId,
    PointStruct, PointsIdsList, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
    vectors_output::VectorsOptions,
};

use super::error::IndexError;
use super::model::{
    self, QueryMatch, article_id_from_payload, document_text_from_payload, metadata_from_payload,
};
use crate::article::IndexedRecord;
use crate::filter::{self, FilterExpression};
use crate::hashing::point_id_for_article;

/// Minimal async interface used by [`super::ArticleIndex`].
///
/// Takes abstract filter expressions; each backend compiles or evaluates
/// them itself so validation errors surface before any query runs.
pub trait IndexClient: Send + Sync {
    /// Returns `true` if the collection exists.
    fn collection_exists(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, IndexError>> + Send;

    /// Creates a collection with cosine distance.
    ///
    /// Fails with [`IndexError::CollectionAlreadyExists`] when another
    /// caller created it first.
    fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), IndexError>> + Send;

    /// Upserts records (idempotent by id).
    fn upsert(
        &self,
        collection: &str,
        records: Vec<IndexedRecord>,
    ) -> impl std::future::Future<Output = Result<(), IndexError>> + Send;

    /// Searches by vector similarity with optional metadata filters.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        filters: &[FilterExpression],
    ) -> impl std::future::Future<Output = Result<Vec<QueryMatch>, IndexError>> + Send;

    /// Fetches one record by article id.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<IndexedRecord>, IndexError>> + Send;

    /// Deletes records by article id.
    fn delete(
        &self,
        collection: &str,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<(), IndexError>> + Send;

    /// Number of stored vectors.
    fn count(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<u64, IndexError>> + Send;
}

#[derive(Clone)]
/// Direct Qdrant client wrapper.
pub struct QdrantIndexClient {
    client: Qdrant,
    url: String,
}

impl QdrantIndexClient {
    /// Creates a client for `url`.
    pub fn new(url: &str) -> Result<Self, IndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| IndexError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), IndexError> {
        self.client
            .health_check()
            .await
            .map_err(|e| IndexError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

impl IndexClient for QdrantIndexClient {
    async fn collection_exists(&self, name: &str) -> Result<bool, IndexError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(|e| IndexError::LookupFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })
    }

    async fn create_collection(&self, name: &str, vector_size: u64) -> Result<(), IndexError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.to_lowercase().contains("already exists") {
                    IndexError::CollectionAlreadyExists {
                        collection: name.to_string(),
                    }
                } else {
                    IndexError::CreateCollectionFailed {
                        collection: name.to_string(),
                        message,
                    }
                }
            })?;

        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: Vec<IndexedRecord>,
    ) -> Result<(), IndexError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let payload = model::record_payload(&record);
                PointStruct::new(point_id_for_article(&record.id), record.embedding, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| IndexError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        filters: &[FilterExpression],
    ) -> Result<Vec<QueryMatch>, IndexError> {
        // Compile before the request so unsupported filters never reach
        // the backend.
        let compiled = filter::compile(filters)?;

        let mut search_builder =
            SearchPointsBuilder::new(collection, query, limit).with_payload(true);

        if let Some(compiled) = compiled {
            search_builder = search_builder.filter(compiled);
        }

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| IndexError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let results = search_result
            .result
            .into_iter()
            .filter_map(model::query_match_from_scored_point)
            .collect();

        Ok(results)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<IndexedRecord>, IndexError> {
        let point_id: PointId = point_id_for_article(id).into();

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, vec![point_id])
                    .with_payload(true)
                    .with_vectors(true),
            )
            .await
            .map_err(|e| IndexError::LookupFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let Some(point) = response.result.into_iter().next() else {
            return Ok(None);
        };

        let payload = point.payload;
        let Some(article_id) = article_id_from_payload(&payload) else {
            return Ok(None);
        };

        let embedding = point
            .vectors
            .and_then(|v| v.vectors_options)
            .map(|options| match options {
                VectorsOptions::Vector(vector) => vector.data,
                VectorsOptions::Vectors(_) => Vec::new(),
            })
            .unwrap_or_default();

        Ok(Some(IndexedRecord {
            id: article_id,
            embedding,
            metadata: metadata_from_payload(&payload),
            document_text: document_text_from_payload(&payload),
        }))
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<(), IndexError> {
        if ids.is_empty() {
            return Ok(());
        }

        let points_selector = PointsIdsList {
            ids: ids
                .iter()
                .map(|id| point_id_for_article(id).into())
                .collect(),
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(points_selector)
                    .wait(true),
            )
            .await
            .map_err(|e| IndexError::DeleteFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64, IndexError> {
        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| IndexError::StatsFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or_default())
    }
}
