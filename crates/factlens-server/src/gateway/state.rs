use std::sync::Arc;

use factlens::{ArticleIndex, Config, EmbeddingEngine, FactChecker, IndexClient, ModelRouter};

/// Shared handler state: the pipeline services, dependency-injected at
/// the composition root.
pub struct HandlerState<C: IndexClient + 'static> {
    pub checker: Arc<FactChecker<C>>,

    pub engine: Arc<EmbeddingEngine>,

    pub index: Arc<ArticleIndex<C>>,

    pub router: Arc<ModelRouter>,

    /// Default embedding model name, echoed in embedding responses.
    pub embedding_model: String,

    /// Default search result limit.
    pub search_limit: u64,
}

impl<C: IndexClient + 'static> Clone for HandlerState<C> {
    fn clone(&self) -> Self {
        Self {
            checker: Arc::clone(&self.checker),
            engine: Arc::clone(&self.engine),
            index: Arc::clone(&self.index),
            router: Arc::clone(&self.router),
            embedding_model: self.embedding_model.clone(),
            search_limit: self.search_limit,
        }
    }
}

impl<C: IndexClient + 'static> HandlerState<C> {
    /// Wires the full pipeline over an index client.
    pub fn new(config: &Config, index_client: C) -> Self {
        let router = Arc::new(ModelRouter::new(config.clone()));
        Self::with_router(config, index_client, router)
    }

    /// Wires the pipeline with an explicit router (tests inject a mock
    /// backend this way).
    pub fn with_router(config: &Config, index_client: C, router: Arc<ModelRouter>) -> Self {
        let engine = Arc::new(EmbeddingEngine::new(Arc::clone(&router)));
        let index = Arc::new(ArticleIndex::new(
            index_client,
            factlens::IndexConfig::from_config(config),
        ));
        let checker = Arc::new(FactChecker::new(
            Arc::clone(&engine),
            Arc::clone(&router),
            Arc::clone(&index),
            config,
        ));

        Self {
            checker,
            engine,
            index,
            router,
            embedding_model: config.embedding_model.clone(),
            search_limit: config.top_k,
        }
    }
}
