use std::time::Instant;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use factlens::{FilterExpression, IndexClient};

use super::error::GatewayError;
use super::payload::{
    EmbeddingData, EmbeddingRequest, Envelope, FactCheckData, FactCheckRequest, RequestContext,
    SearchArticle, SearchData, SearchRequest, StatsData, UsageData,
};
use super::state::HandlerState;

fn ok_response<T: Serialize>(ctx: &RequestContext, data: T) -> Response {
    (StatusCode::OK, Json(Envelope::ok(data, ctx.meta()))).into_response()
}

fn err_response(ctx: &RequestContext, error: GatewayError) -> Response {
    if error.status().is_server_error() {
        warn!(request_id = %ctx.request_id(), error = %error, "Request failed");
    } else {
        debug!(request_id = %ctx.request_id(), error = %error, "Request rejected");
    }

    let envelope = Envelope::<()>::err(error.body(), ctx.meta());
    (error.status(), Json(envelope)).into_response()
}

/// `POST /api/fact-check`: check a claim or every claim of a text.
///
/// Exactly one of `claim`/`text` is expected; `articleId` alone names a
/// stored-article path that is not implemented.
#[instrument(skip(state, request))]
pub async fn fact_check_handler<C>(
    State(state): State<HandlerState<C>>,
    Json(request): Json<FactCheckRequest>,
) -> Response
where
    C: IndexClient + 'static,
{
    let ctx = RequestContext::new();

    let claim = request.claim.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let text = request.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let article_id = request.article_id.as_deref();

    let outcome = match (claim, text) {
        (None, None) if article_id.is_some() => Err(GatewayError::NotImplemented(
            "fact-checking a stored article by id is not implemented".to_string(),
        )),
        (None, None) => Err(GatewayError::InvalidRequest(
            "provide exactly one of 'claim' or 'text'".to_string(),
        )),
        (Some(_), Some(_)) => Err(GatewayError::InvalidRequest(
            "provide exactly one of 'claim' or 'text', not both".to_string(),
        )),
        (Some(claim), None) => state
            .checker
            .check_claim(claim, article_id)
            .await
            .map(FactCheckData::Claim)
            .map_err(GatewayError::from),
        (None, Some(text)) => state
            .checker
            .check_text(text)
            .await
            .map(FactCheckData::Report)
            .map_err(GatewayError::from),
    };

    match outcome {
        Ok(data) => {
            info!(request_id = %ctx.request_id(), "Fact-check complete");
            ok_response(&ctx, data)
        }
        Err(e) => err_response(&ctx, e),
    }
}

/// `POST /api/search`: semantic search over indexed articles.
#[instrument(skip(state, request), fields(query_len = request.query.len()))]
pub async fn search_handler<C>(
    State(state): State<HandlerState<C>>,
    Json(request): Json<SearchRequest>,
) -> Response
where
    C: IndexClient + 'static,
{
    let ctx = RequestContext::new();
    let search_started = Instant::now();

    let query = request.query.trim();
    if query.is_empty() {
        return err_response(
            &ctx,
            GatewayError::InvalidRequest("query must not be empty".to_string()),
        );
    }

    let mut filters = Vec::new();
    if let Some(f) = &request.filters {
        if let Some(sources) = &f.sources
            && !sources.is_empty()
        {
            filters.push(FilterExpression::source_in(sources.iter().cloned()));
        }
        if let Some(categories) = &f.categories
            && !categories.is_empty()
        {
            filters.push(FilterExpression::category_in(categories.iter().cloned()));
        }
        if f.date_from.is_some() || f.date_to.is_some() {
            filters.push(FilterExpression::published_between(f.date_from, f.date_to));
        }
        if let Some(floor) = f.min_credibility {
            filters.push(FilterExpression::min_credibility(floor));
        }
    }

    let limit = request.limit.unwrap_or(state.search_limit);

    let embedding = match state.engine.embed(query, None).await {
        Ok(embedding) => embedding,
        Err(e) => return err_response(&ctx, e.into()),
    };

    let matches = match state.index.query(embedding, limit, &filters).await {
        Ok(matches) => matches,
        Err(e) => return err_response(&ctx, e.into()),
    };

    let relevance_scores: Vec<f32> = matches.iter().map(|m| m.score).collect();
    let articles: Vec<SearchArticle> = matches
        .into_iter()
        .map(|m| SearchArticle {
            id: m.id,
            metadata: m.metadata,
        })
        .collect();

    let data = SearchData {
        total_count: articles.len(),
        query: query.to_string(),
        processing_time: search_started.elapsed().as_millis() as u64,
        relevance_scores,
        articles,
    };

    ok_response(&ctx, data)
}

/// `POST /api/embedding`: embed caller-supplied text.
#[instrument(skip(state, request), fields(text_len = request.text.len()))]
pub async fn embedding_handler<C>(
    State(state): State<HandlerState<C>>,
    Json(request): Json<EmbeddingRequest>,
) -> Response
where
    C: IndexClient + 'static,
{
    let ctx = RequestContext::new();

    let result = state
        .engine
        .embed_with_usage(&request.text, request.model.as_deref())
        .await;

    match result {
        Ok((embedding, usage)) => {
            let data = EmbeddingData {
                embedding,
                model: request
                    .model
                    .unwrap_or_else(|| state.embedding_model.clone()),
                usage: UsageData {
                    prompt_tokens: usage.prompt_tokens,
                    total_tokens: usage.total_tokens,
                },
            };
            ok_response(&ctx, data)
        }
        Err(e) => err_response(&ctx, e.into()),
    }
}

/// `GET /api/index/stats`: vector collection statistics.
#[instrument(skip(state))]
pub async fn stats_handler<C>(State(state): State<HandlerState<C>>) -> Response
where
    C: IndexClient + 'static,
{
    let ctx = RequestContext::new();

    match state.index.stats().await {
        Ok(stats) => ok_response(&ctx, StatsData::from(stats)),
        Err(e) => err_response(&ctx, e.into()),
    }
}
