//! Gemini provider: Generative Language API embeddings and completions.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use super::{EmbeddingBatch, LanguageModel, TokenUsage};
use crate::config::{Config, ProviderKind};

const PROVIDER_NAME: &str = "gemini";

/// Default chat completion model.
pub const GEMINI_COMPLETION_MODEL: &str = "gemini-2.0-flash";

/// Default embedding model (768-dimensional vectors).
pub const GEMINI_EMBEDDING_MODEL: &str = "text-embedding-004";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug)]
/// Gemini-backed language model.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    embedding_model: String,
    completion_model: String,
}

impl GeminiProvider {
    /// Builds a provider from config.
    ///
    /// Fails with [`ProviderError::NotConfigured`] when `GEMINI_API_KEY`
    /// is absent.
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured {
                provider: PROVIDER_NAME,
                variable: "GEMINI_API_KEY",
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key.trim()).map_err(|e| {
                ProviderError::ClientBuildFailed {
                    provider: PROVIDER_NAME,
                    message: format!("invalid API key: {}", e),
                }
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::ClientBuildFailed {
                provider: PROVIDER_NAME,
                message: e.to_string(),
            })?;

        // The configured embedding model may name an OpenAI model when the
        // router fell back to Gemini; only keep it if it is a Gemini one.
        let embedding_model = if config.embedding_model.starts_with("text-embedding-0")
            || config.embedding_model.starts_with("gemini-embedding")
        {
            config.embedding_model.clone()
        } else {
            GEMINI_EMBEDDING_MODEL.to_string()
        };

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model,
            completion_model: config
                .completion_model
                .clone()
                .unwrap_or_else(|| GEMINI_COMPLETION_MODEL.to_string()),
        })
    }

    /// Returns `true` when the credential this provider needs is present.
    pub fn is_configured(config: &Config) -> bool {
        config.gemini_api_key.is_some()
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp, ProviderError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                message: format!("{}: {}", status, body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                message: format!("failed to parse response: {}", e),
            })
    }
}

impl LanguageModel for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<EmbeddingBatch, ProviderError> {
        if texts.is_empty() {
            return Ok(EmbeddingBatch {
                vectors: Vec::new(),
                usage: TokenUsage::default(),
            });
        }

        let model = model.unwrap_or(&self.embedding_model);
        let qualified = format!("models/{}", model);

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: &qualified,
                    content: ContentIn {
                        parts: vec![PartIn { text }],
                    },
                })
                .collect(),
        };

        let url = format!("{}/{}:batchEmbedContents", self.base_url, qualified);
        let parsed: BatchEmbedResponse = self.post_json(url, &request).await?;

        if parsed.embeddings.is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER_NAME,
                what: "embedding",
            });
        }

        if parsed.embeddings.len() != texts.len() {
            return Err(ProviderError::EmbeddingCountMismatch {
                provider: PROVIDER_NAME,
                expected: texts.len(),
                actual: parsed.embeddings.len(),
            });
        }

        // Embedding usage is not reported by this API.
        Ok(EmbeddingBatch {
            vectors: parsed.embeddings.into_iter().map(|e| e.values).collect(),
            usage: TokenUsage::default(),
        })
    }

    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        let model = model.unwrap_or(&self.completion_model);

        let request = GenerateRequest {
            contents: vec![ContentIn {
                parts: vec![PartIn { text: prompt }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let parsed: GenerateResponse = self.post_json(url, &request).await?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER_NAME,
                what: "completion",
            });
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: ContentIn<'a>,
}

#[derive(Serialize)]
struct ContentIn<'a> {
    parts: Vec<PartIn<'a>>,
}

#[derive(Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<ContentIn<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ContentOut,
}

#[derive(Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize)]
struct PartOut {
    text: Option<String>,
}
