//! Gateway handler tests over mock backends: envelope shape, status
//! classes, and the three core operations.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use factlens::{
    Article, Config, IndexedRecord, MockIndexClient, MockProvider, ModelRouter, ProviderBackend,
};

use crate::gateway::create_router_with_state;
use crate::gateway::state::HandlerState;

const DIM: usize = 8;

struct TestGateway {
    app: Router,
    provider: Arc<MockProvider>,
    state: HandlerState<MockIndexClient>,
}

fn gateway() -> TestGateway {
    let config = Config {
        embedding_dim: DIM,
        ..Default::default()
    };

    let provider = Arc::new(MockProvider::new(DIM));
    let router = Arc::new(ModelRouter::with_backend(
        config.clone(),
        ProviderBackend::Mock(Arc::clone(&provider)),
    ));
    let state = HandlerState::with_router(&config, MockIndexClient::new(), router);

    TestGateway {
        app: create_router_with_state(state.clone()),
        provider,
        state,
    }
}

fn article(url: &str, source: &str, credibility: f64, content: &str) -> Article {
    Article {
        id: Article::id_for_url(url),
        title: format!("Report from {}", source),
        content: content.to_string(),
        summary: None,
        url: url.to_string(),
        source: source.to_string(),
        author: None,
        published_at: Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap(),
        category: "economy".to_string(),
        tags: BTreeSet::new(),
        credibility_score: credibility,
        image_url: None,
        language: "en".to_string(),
    }
}

async fn seed(g: &TestGateway, articles: &[Article]) {
    let records: Vec<IndexedRecord> = articles
        .iter()
        .map(|a| IndexedRecord::from_article(a, g.provider.embedding_for(&a.embedding_input())))
        .collect();
    g.state.index.upsert_batch(records).await.expect("seed");
}

async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

fn assert_meta(envelope: &serde_json::Value) {
    let meta = &envelope["meta"];
    assert!(meta["requestId"].is_string());
    assert!(meta["timestamp"].is_string());
    assert!(meta["processingTime"].is_number());
}

#[tokio::test]
async fn healthz_reports_ok() {
    let g = gateway();
    let (status, body) = get_json(g.app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ready_reports_components() {
    let g = gateway();
    let (status, body) = get_json(g.app, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["vectordb"], "ready");
}

#[tokio::test]
async fn fact_check_claim_returns_success_envelope() {
    let g = gateway();
    seed(
        &g,
        &[article(
            "https://example.com/jobs",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    g.provider.push_completion(
        r#"{"verdict": "TRUE", "confidence": 0.9, "explanation": "Matches the figures."}"#,
    );

    let (status, body) = post_json(
        g.app,
        "/api/fact-check",
        serde_json::json!({"claim": "The unemployment rate is 3.5%"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["verdict"], "TRUE");
    assert_eq!(body["data"]["claim"], "The unemployment rate is 3.5%");
    assert!(body["data"]["supportingEvidence"].is_array());
    assert!(body["error"].is_null());
    assert_meta(&body);
}

#[tokio::test]
async fn fact_check_text_returns_per_claim_report() {
    let g = gateway();
    seed(
        &g,
        &[article(
            "https://example.com/jobs",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    g.provider
        .push_completion(r#"["The unemployment rate held at 3.5% in July"]"#);
    g.provider.push_completion(
        r#"{"verdict": "TRUE", "confidence": 0.8, "explanation": "Supported."}"#,
    );

    let (status, body) = post_json(
        g.app,
        "/api/fact-check",
        serde_json::json!({"text": "Some article body to check."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["claimsChecked"], 1);
    assert_eq!(body["data"]["outcomes"][0]["result"]["verdict"], "TRUE");
}

#[tokio::test]
async fn fact_check_rejects_claim_and_text_together() {
    let g = gateway();

    let (status, body) = post_json(
        g.app,
        "/api/fact-check",
        serde_json::json!({"claim": "a claim", "text": "a text"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["data"].is_null());
    assert_meta(&body);
}

#[tokio::test]
async fn fact_check_rejects_empty_request() {
    let g = gateway();

    let (status, body) = post_json(g.app, "/api/fact-check", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn fact_check_by_article_id_alone_is_not_implemented() {
    let g = gateway();

    let (status, body) = post_json(
        g.app,
        "/api/fact-check",
        serde_json::json!({"articleId": "abc123"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
}

#[tokio::test]
async fn embedding_endpoint_returns_vector_and_usage() {
    let g = gateway();

    let (status, body) = post_json(
        g.app,
        "/api/embedding",
        serde_json::json!({"text": "The unemployment rate held steady in July."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["embedding"].as_array().unwrap().len(), DIM);
    assert_eq!(body["data"]["model"], "text-embedding-3-small");
    assert!(body["data"]["usage"]["promptTokens"].is_number());
    assert!(body["data"]["usage"]["totalTokens"].is_number());
}

#[tokio::test]
async fn embedding_endpoint_rejects_unsuitable_text() {
    let g = gateway();

    let (status, body) =
        post_json(g.app, "/api/embedding", serde_json::json!({"text": "hi"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn search_returns_positional_relevance_scores() {
    let g = gateway();
    seed(
        &g,
        &[
            article(
                "https://example.com/high",
                "Reliable Wire",
                0.9,
                "The unemployment rate held at 3.5% in July.",
            ),
            article(
                "https://example.com/low",
                "Tabloid",
                0.4,
                "Unemployment rumors swirl among insiders.",
            ),
        ],
    )
    .await;

    let (status, body) = post_json(
        g.app,
        "/api/search",
        serde_json::json!({
            "query": "unemployment rate in july",
            "filters": {"minCredibility": 0.6},
            "limit": 5
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let articles = data["articles"].as_array().unwrap();
    let scores = data["relevanceScores"].as_array().unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(scores.len(), articles.len());
    assert_eq!(data["totalCount"], 1);
    assert_eq!(data["query"], "unemployment rate in july");
    assert_eq!(articles[0]["source"], "Reliable Wire");
    assert!(data["processingTime"].is_number());
}

#[tokio::test]
async fn search_rejects_empty_query() {
    let g = gateway();

    let (status, body) =
        post_json(g.app, "/api/search", serde_json::json!({"query": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn stats_endpoint_reports_collection_shape() {
    let g = gateway();
    seed(
        &g,
        &[article(
            "https://example.com/jobs",
            "Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    let (status, body) = get_json(g.app, "/api/index/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalVectors"], 1);
    assert_eq!(body["data"]["dimension"], DIM);
    assert_eq!(body["data"]["indexFullness"], 0.0);
}

#[tokio::test]
async fn request_ids_are_fresh_per_request() {
    let g = gateway();

    let (_, first) = post_json(
        g.app.clone(),
        "/api/embedding",
        serde_json::json!({"text": "The unemployment rate held steady in July."}),
    )
    .await;
    let (_, second) = post_json(
        g.app,
        "/api/embedding",
        serde_json::json!({"text": "The unemployment rate held steady in July."}),
    )
    .await;

    assert_ne!(first["meta"]["requestId"], second["meta"]["requestId"]);
}
