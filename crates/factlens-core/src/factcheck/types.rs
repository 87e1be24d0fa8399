//! Verdict and result types, plus strict parsing of model output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed verdict set. Unknown values are rejected at deserialization,
/// never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    True,
    False,
    PartiallyTrue,
    Misleading,
    Unverified,
}

/// One piece of supporting evidence, derived per query (never persisted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Id of the article the snippet came from.
    pub article_id: String,
    /// Most claim-relevant snippet, at most 200 characters.
    pub relevant_text: String,
    /// Article source name.
    pub source: String,
    /// Source credibility in `[0, 1]`.
    pub credibility_score: f64,
}

/// Outcome of checking one claim. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheckResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    pub claim: String,
    pub verdict: Verdict,
    /// Clamped to `[0, 1]`.
    pub confidence: f64,
    pub supporting_evidence: Vec<Evidence>,
    pub explanation: String,
    pub checked_at: DateTime<Utc>,
}

/// Per-claim outcome of a multi-claim check. One claim failing leaves
/// the others untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    pub claim: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FactCheckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of checking every extracted claim of an article or text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCheckReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    pub claims_checked: usize,
    pub outcomes: Vec<ClaimOutcome>,
}

/// Parsed and clamped verdict synthesis output.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedVerdict {
    pub verdict: Verdict,
    pub confidence: f64,
    pub explanation: String,
}

/// Explanation attached to the fixed fallback result.
pub const FALLBACK_EXPLANATION: &str =
    "Unable to verify claim due to analysis error. Please review manually.";

/// Confidence attached to the fixed fallback result.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

impl SynthesizedVerdict {
    /// The fixed local-recovery result used when synthesis fails.
    pub fn fallback() -> Self {
        Self {
            verdict: Verdict::Unverified,
            confidence: FALLBACK_CONFIDENCE,
            explanation: FALLBACK_EXPLANATION.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawVerdict {
    verdict: Verdict,
    confidence: f64,
    explanation: String,
}

/// Parses a model completion as a strict verdict object.
///
/// Accepts exactly `{verdict, confidence, explanation}` with a known
/// verdict value, numeric confidence, string explanation. A Markdown
/// code fence around the JSON is removed; nothing else is repaired.
/// Confidence outside `[0, 1]` is clamped, not rejected.
pub fn parse_verdict_response(response: &str) -> Option<SynthesizedVerdict> {
    let raw: RawVerdict = serde_json::from_str(strip_code_fences(response)).ok()?;

    if !raw.confidence.is_finite() {
        return None;
    }

    Some(SynthesizedVerdict {
        verdict: raw.verdict,
        confidence: raw.confidence.clamp(0.0, 1.0),
        explanation: raw.explanation,
    })
}

/// Parses a model completion as a JSON array of claim strings.
///
/// Parse failure yields the empty list: zero claims means "nothing to
/// check", not an error.
pub fn parse_claim_list(response: &str) -> Vec<String> {
    serde_json::from_str(strip_code_fences(response)).unwrap_or_default()
}

/// Removes one surrounding Markdown code fence, if present.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
