use axum::http::StatusCode;
use thiserror::Error;

use factlens::{EmbeddingError, FactCheckError, IndexError, ProviderError};

use super::payload::ErrorBody;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("no language model provider is configured")]
    NoProviderAvailable,

    #[error("provider error: {0}")]
    ProviderFailed(String),

    #[error("retrieval error: {0}")]
    RetrievalFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status class: 400 validation, 501 unimplemented, 500 the rest.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            GatewayError::NoProviderAvailable
            | GatewayError::ProviderFailed(_)
            | GatewayError::RetrievalFailed(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "VALIDATION_ERROR",
            GatewayError::NotImplemented(_) => "NOT_IMPLEMENTED",
            GatewayError::NoProviderAvailable => "NO_PROVIDER_AVAILABLE",
            GatewayError::ProviderFailed(_) => "PROVIDER_ERROR",
            GatewayError::RetrievalFailed(_) => "RETRIEVAL_ERROR",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            code: self.code().to_string(),
            details: None,
        }
    }
}

impl From<EmbeddingError> for GatewayError {
    fn from(e: EmbeddingError) -> Self {
        match e {
            EmbeddingError::UnsuitableText { .. } => GatewayError::InvalidRequest(e.to_string()),
            EmbeddingError::DimensionMismatch { .. } => GatewayError::Internal(e.to_string()),
            EmbeddingError::Provider(p) => p.into(),
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NoProviderAvailable => GatewayError::NoProviderAvailable,
            other => GatewayError::ProviderFailed(other.to_string()),
        }
    }
}

impl From<IndexError> for GatewayError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Filter(f) => GatewayError::InvalidRequest(f.to_string()),
            other => GatewayError::RetrievalFailed(other.to_string()),
        }
    }
}

impl From<FactCheckError> for GatewayError {
    fn from(e: FactCheckError) -> Self {
        match e {
            FactCheckError::InvalidClaim { .. } => GatewayError::InvalidRequest(e.to_string()),
            FactCheckError::Embedding(inner) => inner.into(),
            FactCheckError::Provider(inner) => inner.into(),
            FactCheckError::Index(inner) => inner.into(),
        }
    }
}
