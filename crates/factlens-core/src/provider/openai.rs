//! OpenAI provider: embeddings and chat completions over the REST API.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use super::{EmbeddingBatch, LanguageModel, TokenUsage};
use crate::config::{Config, ProviderKind};

const PROVIDER_NAME: &str = "openai";

/// Default chat completion model.
pub const OPENAI_COMPLETION_MODEL: &str = "gpt-4o-mini";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Low temperature keeps verdict synthesis close to deterministic.
const COMPLETION_TEMPERATURE: f32 = 0.1;

#[derive(Clone, Debug)]
/// OpenAI-backed language model.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    embedding_model: String,
    completion_model: String,
}

impl OpenAiProvider {
    /// Builds a provider from config.
    ///
    /// Fails with [`ProviderError::NotConfigured`] when `OPENAI_API_KEY`
    /// is absent: construction is the configuration check, calls never
    /// discover missing credentials lazily.
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured {
                provider: PROVIDER_NAME,
                variable: "OPENAI_API_KEY",
            })?;

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| ProviderError::ClientBuildFailed {
                provider: PROVIDER_NAME,
                message: format!("invalid API key: {}", e),
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

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: config.embedding_model.clone(),
            completion_model: config
                .completion_model
                .clone()
                .unwrap_or_else(|| OPENAI_COMPLETION_MODEL.to_string()),
        })
    }

    /// Returns `true` when the credential this provider needs is present.
    pub fn is_configured(config: &Config) -> bool {
        config.openai_api_key.is_some()
    }
}

impl LanguageModel for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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

        let request = EmbeddingRequest {
            model: model.unwrap_or(&self.embedding_model),
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request)
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

        let mut parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: PROVIDER_NAME,
                    message: format!("failed to parse embedding response: {}", e),
                })?;

        if parsed.data.is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER_NAME,
                what: "embedding",
            });
        }

        if parsed.data.len() != texts.len() {
            return Err(ProviderError::EmbeddingCountMismatch {
                provider: PROVIDER_NAME,
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }

        // The API documents response order as input order; sort by index
        // anyway since the contract upstream is positional.
        parsed.data.sort_by_key(|entry| entry.index);

        let usage = TokenUsage {
            prompt_tokens: parsed.usage.prompt_tokens,
            total_tokens: parsed.usage.total_tokens,
        };

        Ok(EmbeddingBatch {
            vectors: parsed.data.into_iter().map(|e| e.embedding).collect(),
            usage,
        })
    }

    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: model.unwrap_or(&self.completion_model),
            temperature: COMPLETION_TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
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

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: PROVIDER_NAME,
                    message: format!("failed to parse chat response: {}", e),
                })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
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
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: EmbeddingUsage,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Default, Deserialize)]
struct EmbeddingUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
