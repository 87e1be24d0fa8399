//! Fact-check orchestration: embed, retrieve, extract, synthesize,
//! assemble.
//!
//! Per-invocation state machine with no persisted state. The embed and
//! retrieve steps propagate failures; verdict synthesis is the one place
//! that recovers locally (to the fixed UNVERIFIED fallback) so callers
//! always receive a well-formed result once evidence retrieval succeeds.

pub mod error;
pub mod snippet;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::FactCheckError;
pub use snippet::{MAX_SNIPPET_LEN, extract_relevant_snippet, split_sentences};
pub use types::{
    ArticleCheckReport, ClaimOutcome, Evidence, FALLBACK_CONFIDENCE, FALLBACK_EXPLANATION,
    FactCheckResult, SynthesizedVerdict, Verdict, parse_claim_list, parse_verdict_response,
};

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, instrument, warn};

use crate::article::Article;
use crate::config::Config;
use crate::embedding::EmbeddingEngine;
use crate::filter::FilterExpression;
use crate::index::{ArticleIndex, IndexClient};
use crate::provider::{LanguageModel, ModelRouter};

/// Claim extraction reads at most this many characters of article text.
pub const CLAIM_EXTRACT_LIMIT: usize = 2000;

/// Drives the retrieval-and-verdict pipeline.
///
/// Explicitly constructed and dependency-injected; hold it behind an
/// `Arc` at the composition root. There is no global instance.
pub struct FactChecker<C: IndexClient> {
    embedding: Arc<EmbeddingEngine>,
    router: Arc<ModelRouter>,
    index: Arc<ArticleIndex<C>>,
    top_k: u64,
    min_credibility: f64,
}

impl<C: IndexClient> FactChecker<C> {
    /// Wires a checker from its collaborators and config.
    pub fn new(
        embedding: Arc<EmbeddingEngine>,
        router: Arc<ModelRouter>,
        index: Arc<ArticleIndex<C>>,
        config: &Config,
    ) -> Self {
        Self {
            embedding,
            router,
            index,
            top_k: config.top_k,
            min_credibility: config.min_credibility,
        }
    }

    /// Checks one claim against indexed evidence.
    ///
    /// Embedding and retrieval failures propagate; sources below the
    /// credibility floor never reach synthesis regardless of similarity.
    #[instrument(skip(self), fields(claim_len = claim.len()))]
    pub async fn check_claim(
        &self,
        claim: &str,
        article_id: Option<&str>,
    ) -> Result<FactCheckResult, FactCheckError> {
        let claim = claim.trim();
        if claim.is_empty() {
            return Err(FactCheckError::InvalidClaim {
                reason: "empty claim".to_string(),
            });
        }

        let claim_embedding = self.embedding.embed(claim, None).await?;

        let credibility_floor = [FilterExpression::min_credibility(self.min_credibility)];
        let matches = self
            .index
            .query(claim_embedding, self.top_k, &credibility_floor)
            .await?;

        debug!(candidates = matches.len(), "Evidence retrieved");

        let evidence: Vec<Evidence> = matches
            .into_iter()
            .map(|m| Evidence {
                relevant_text: extract_relevant_snippet(claim, &m.document_text),
                source: m.metadata.source.clone(),
                credibility_score: m.metadata.credibility_score,
                article_id: m.id,
            })
            .collect();

        let synthesis = self.synthesize_verdict(claim, &evidence).await;

        Ok(FactCheckResult {
            article_id: article_id.map(str::to_string),
            claim: claim.to_string(),
            verdict: synthesis.verdict,
            confidence: synthesis.confidence,
            supporting_evidence: evidence,
            explanation: synthesis.explanation,
            checked_at: Utc::now(),
        })
    }

    /// Extracts verifiable claims from free text and checks each one.
    ///
    /// Claims resolve independently: one claim's failure is recorded in
    /// its own outcome and never aborts the rest of the batch.
    pub async fn check_text(&self, text: &str) -> Result<ArticleCheckReport, FactCheckError> {
        self.check_claims_of(None, text).await
    }

    /// Extracts claims from an article's content and checks each one.
    pub async fn check_article(
        &self,
        article: &Article,
    ) -> Result<ArticleCheckReport, FactCheckError> {
        self.check_claims_of(Some(article.id.as_str()), &article.content)
            .await
    }

    async fn check_claims_of(
        &self,
        article_id: Option<&str>,
        text: &str,
    ) -> Result<ArticleCheckReport, FactCheckError> {
        let claims = self.extract_claims(text).await?;

        if claims.is_empty() {
            debug!("No verifiable claims extracted, nothing to check");
            return Ok(ArticleCheckReport {
                article_id: article_id.map(str::to_string),
                claims_checked: 0,
                outcomes: Vec::new(),
            });
        }

        let checks = claims
            .iter()
            .map(|claim| self.check_claim(claim, article_id));
        let results = join_all(checks).await;

        let outcomes: Vec<ClaimOutcome> = claims
            .into_iter()
            .zip(results)
            .map(|(claim, result)| match result {
                Ok(result) => ClaimOutcome {
                    claim,
                    result: Some(result),
                    error: None,
                },
                Err(e) => {
                    warn!(error = %e, "Claim check failed within batch");
                    ClaimOutcome {
                        claim,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        Ok(ArticleCheckReport {
            article_id: article_id.map(str::to_string),
            claims_checked: outcomes.len(),
            outcomes,
        })
    }

    /// Asks the model for 3–5 verifiable statements from the text head.
    ///
    /// Unparseable output yields the empty list; provider failures
    /// propagate.
    pub async fn extract_claims(&self, text: &str) -> Result<Vec<String>, FactCheckError> {
        let head: String = text.chars().take(CLAIM_EXTRACT_LIMIT).collect();
        let prompt = claim_extraction_prompt(&head);

        let provider = self.router.active().await?;
        let response = provider.complete(&prompt, None).await?;

        Ok(parse_claim_list(&response))
    }

    /// Builds the verdict prompt, calls the model, parses strictly.
    ///
    /// Never fails: any model, parse or schema error degrades to
    /// [`SynthesizedVerdict::fallback`].
    async fn synthesize_verdict(&self, claim: &str, evidence: &[Evidence]) -> SynthesizedVerdict {
        let prompt = verdict_prompt(claim, evidence);

        let response = match self.router.active().await {
            Ok(provider) => provider.complete(&prompt, None).await,
            Err(e) => Err(e),
        };

        match response {
            Ok(text) => parse_verdict_response(&text).unwrap_or_else(|| {
                warn!("Model verdict did not match the expected schema, using fallback");
                SynthesizedVerdict::fallback()
            }),
            Err(e) => {
                warn!(error = %e, "Verdict synthesis call failed, using fallback");
                SynthesizedVerdict::fallback()
            }
        }
    }
}

fn verdict_prompt(claim: &str, evidence: &[Evidence]) -> String {
    let rendered_evidence = if evidence.is_empty() {
        "- (no evidence retrieved)".to_string()
    } else {
        evidence
            .iter()
            .map(|e| {
                format!(
                    "- {} (credibility: {:.2}): {}",
                    e.source, e.credibility_score, e.relevant_text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are a meticulous fact checker. Judge the claim using only the \
evidence provided below.\n\n\
Claim:\n{claim}\n\n\
Evidence:\n{rendered_evidence}\n\n\
Respond with a single JSON object and nothing else:\n\
{{\"verdict\": \"TRUE\" | \"FALSE\" | \"PARTIALLY_TRUE\" | \"MISLEADING\" | \"UNVERIFIED\", \
\"confidence\": <number between 0 and 1>, \"explanation\": \"<short justification>\"}}\n\
If the evidence is insufficient or contradictory, use \"UNVERIFIED\"."
    )
}

fn claim_extraction_prompt(text: &str) -> String {
    format!(
        "You are an expert at extracting verifiable factual claims. Extract \
3 to 5 verifiable factual statements from the article text below. Ignore \
opinions, predictions and advice. Return a JSON array of strings and \
nothing else.\n\nArticle:\n{text}"
    )
}
