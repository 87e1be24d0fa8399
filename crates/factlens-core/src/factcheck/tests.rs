use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::*;
use crate::article::{Article, IndexedRecord};
use crate::config::Config;
use crate::embedding::EmbeddingEngine;
use crate::index::{ArticleIndex, IndexConfig, MockIndexClient};
use crate::provider::{MockProvider, ModelRouter, ProviderBackend};

const DIM: usize = 8;

struct Harness {
    checker: FactChecker<MockIndexClient>,
    provider: Arc<MockProvider>,
    index: Arc<ArticleIndex<MockIndexClient>>,
}

fn harness() -> Harness {
    let config = Config {
        embedding_dim: DIM,
        ..Default::default()
    };

    let provider = Arc::new(MockProvider::new(DIM));
    let router = Arc::new(ModelRouter::with_backend(
        config.clone(),
        ProviderBackend::Mock(Arc::clone(&provider)),
    ));
    let embedding = Arc::new(EmbeddingEngine::new(Arc::clone(&router)));
    let index = Arc::new(ArticleIndex::new(
        MockIndexClient::new(),
        IndexConfig::from_config(&config),
    ));

    Harness {
        checker: FactChecker::new(embedding, router, Arc::clone(&index), &config),
        provider,
        index,
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

async fn seed(harness: &Harness, articles: &[Article]) {
    let records: Vec<IndexedRecord> = articles
        .iter()
        .map(|a| IndexedRecord::from_article(a, harness.provider.embedding_for(&a.embedding_input())))
        .collect();
    harness.index.upsert_batch(records).await.expect("seed");
}

const CLAIM: &str = "The unemployment rate is 3.5%";

fn good_verdict_json() -> &'static str {
    r#"{"verdict": "TRUE", "confidence": 0.85, "explanation": "Matches official figures."}"#
}

// Scenario A: the credibility floor removes low-credibility evidence
// before synthesis ever sees it.
#[tokio::test]
async fn low_credibility_sources_never_become_evidence() {
    let h = harness();
    seed(
        &h,
        &[
            article(
                "https://example.com/high",
                "Reliable Wire",
                0.9,
                "The unemployment rate held at 3.5% in July. Markets were calm.",
            ),
            article(
                "https://example.com/low",
                "Tabloid",
                0.5,
                "The unemployment rate is 3.5% according to sources.",
            ),
        ],
    )
    .await;

    h.provider.push_completion(good_verdict_json());

    let result = h.checker.check_claim(CLAIM, None).await.expect("checks");

    assert_eq!(result.supporting_evidence.len(), 1);
    assert_eq!(result.supporting_evidence[0].source, "Reliable Wire");
    assert_eq!(result.supporting_evidence[0].credibility_score, 0.9);
    assert_eq!(result.verdict, Verdict::True);
    assert_eq!(result.confidence, 0.85);
}

// Scenario B: invalid JSON from the model degrades to the fixed fallback.
#[tokio::test]
async fn invalid_model_json_degrades_to_fallback() {
    let h = harness();
    seed(
        &h,
        &[article(
            "https://example.com/high",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    h.provider.push_completion("I think the claim is probably true!");

    let result = h.checker.check_claim(CLAIM, None).await.expect("checks");

    assert_eq!(result.verdict, Verdict::Unverified);
    assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    assert_eq!(result.explanation, FALLBACK_EXPLANATION);
}

// An unknown verdict value is a synthesis failure, not a coercion.
#[tokio::test]
async fn unknown_verdict_value_degrades_to_fallback() {
    let h = harness();
    seed(
        &h,
        &[article(
            "https://example.com/high",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    h.provider.push_completion(
        r#"{"verdict": "MOSTLY_TRUE", "confidence": 0.9, "explanation": "close enough"}"#,
    );

    let result = h.checker.check_claim(CLAIM, None).await.expect("checks");
    assert_eq!(result.verdict, Verdict::Unverified);
    assert_eq!(result.explanation, FALLBACK_EXPLANATION);
}

// Scenario C: out-of-range confidence is clamped, not rejected.
#[tokio::test]
async fn confidence_above_one_is_clamped() {
    let h = harness();
    seed(
        &h,
        &[article(
            "https://example.com/high",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    h.provider.push_completion(
        r#"{"verdict": "TRUE", "confidence": 1.7, "explanation": "very sure"}"#,
    );

    let result = h.checker.check_claim(CLAIM, None).await.expect("checks");
    assert_eq!(result.verdict, Verdict::True);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.explanation, "very sure");
}

// A model call failure during synthesis also degrades to the fallback.
#[tokio::test]
async fn synthesis_call_failure_degrades_to_fallback() {
    let h = harness();
    seed(
        &h,
        &[article(
            "https://example.com/high",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    h.provider.fail_completions(true);

    let result = h.checker.check_claim(CLAIM, None).await.expect("checks");
    assert_eq!(result.verdict, Verdict::Unverified);
    assert_eq!(result.explanation, FALLBACK_EXPLANATION);
}

// Embedding failure, by contrast, is fatal for the call.
#[tokio::test]
async fn embedding_failure_propagates() {
    let h = harness();
    h.provider.fail_embeddings(true);

    let err = h.checker.check_claim(CLAIM, None).await.expect_err("fatal");
    assert!(matches!(err, FactCheckError::Embedding(_)));
}

#[tokio::test]
async fn empty_claim_is_rejected_before_any_call() {
    let h = harness();

    let err = h.checker.check_claim("   ", None).await.expect_err("invalid");
    assert!(matches!(err, FactCheckError::InvalidClaim { .. }));
}

#[tokio::test]
async fn evidence_snippets_are_claim_relevant() {
    let h = harness();
    seed(
        &h,
        &[article(
            "https://example.com/high",
            "Reliable Wire",
            0.9,
            "The weather was mild. The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    h.provider.push_completion(good_verdict_json());

    let result = h.checker.check_claim(CLAIM, None).await.expect("checks");
    let snippet = &result.supporting_evidence[0].relevant_text;
    assert!(snippet.contains("unemployment rate"));
    assert!(!snippet.contains("weather"));
    assert!(snippet.chars().count() <= MAX_SNIPPET_LEN);
}

#[tokio::test]
async fn extract_claims_parses_json_array() {
    let h = harness();
    h.provider
        .push_completion(r#"["The rate is 3.5%", "GDP grew 2%"]"#);

    let claims = h.checker.extract_claims("some article text").await.unwrap();
    assert_eq!(claims, vec!["The rate is 3.5%", "GDP grew 2%"]);
}

#[tokio::test]
async fn extract_claims_strips_code_fences() {
    let h = harness();
    h.provider
        .push_completion("```json\n[\"The rate is 3.5%\"]\n```");

    let claims = h.checker.extract_claims("some article text").await.unwrap();
    assert_eq!(claims, vec!["The rate is 3.5%"]);
}

#[tokio::test]
async fn extract_claims_parse_failure_means_nothing_to_check() {
    let h = harness();
    h.provider.push_completion("no structured claims here");

    let claims = h.checker.extract_claims("some article text").await.unwrap();
    assert!(claims.is_empty());
}

#[tokio::test]
async fn check_text_collects_partial_results() {
    let h = harness();
    seed(
        &h,
        &[article(
            "https://example.com/high",
            "Reliable Wire",
            0.9,
            "The unemployment rate held at 3.5% in July.",
        )],
    )
    .await;

    // One checkable claim and one too short to embed.
    h.provider
        .push_completion(r#"["The unemployment rate held at 3.5% in July", "No"]"#);
    h.provider.push_completion(good_verdict_json());

    let report = h.checker.check_text("article body").await.expect("report");

    assert_eq!(report.claims_checked, 2);
    assert_eq!(report.outcomes.len(), 2);

    let ok = &report.outcomes[0];
    assert!(ok.result.is_some());
    assert!(ok.error.is_none());

    let failed = &report.outcomes[1];
    assert!(failed.result.is_none());
    assert!(failed.error.is_some());
}

#[tokio::test]
async fn check_text_with_no_claims_is_empty_report() {
    let h = harness();
    h.provider.push_completion("[]");

    let report = h.checker.check_text("article body").await.expect("report");
    assert_eq!(report.claims_checked, 0);
    assert!(report.outcomes.is_empty());
}

#[tokio::test]
async fn check_article_tags_outcomes_with_article_id() {
    let h = harness();
    let subject = article(
        "https://example.com/subject",
        "Reliable Wire",
        0.9,
        "The unemployment rate held at 3.5% in July. Officials confirmed the figure.",
    );
    seed(&h, &[subject.clone()]).await;

    h.provider
        .push_completion(r#"["The unemployment rate held at 3.5% in July"]"#);
    h.provider.push_completion(good_verdict_json());

    let report = h.checker.check_article(&subject).await.expect("report");

    assert_eq!(report.article_id.as_deref(), Some(subject.id.as_str()));
    let result = report.outcomes[0].result.as_ref().expect("result");
    assert_eq!(result.article_id.as_deref(), Some(subject.id.as_str()));
}

#[test]
fn verdict_parsing_is_strict_but_clamps_confidence() {
    assert_eq!(parse_verdict_response("not json"), None);
    assert_eq!(
        parse_verdict_response(r#"{"verdict": "TRUE", "confidence": "high", "explanation": "x"}"#),
        None
    );
    assert_eq!(
        parse_verdict_response(r#"{"verdict": "TRUE", "confidence": 0.5}"#),
        None
    );

    let clamped_low =
        parse_verdict_response(r#"{"verdict": "FALSE", "confidence": -3, "explanation": "x"}"#)
            .unwrap();
    assert_eq!(clamped_low.confidence, 0.0);

    let fenced = parse_verdict_response(
        "```json\n{\"verdict\": \"MISLEADING\", \"confidence\": 0.4, \"explanation\": \"x\"}\n```",
    )
    .unwrap();
    assert_eq!(fenced.verdict, Verdict::Misleading);
}
