//! Configured-preference-then-fallback provider selection.

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::error::ProviderError;
use super::{GeminiProvider, OpenAiProvider, ProviderBackend};
use crate::config::{Config, ProviderKind};

/// Selects and caches one active [`ProviderBackend`] per process.
///
/// Selection runs at most once; concurrent first calls converge on the
/// same backend through the cell. Construct a fresh router (or call
/// [`ModelRouter::reset`]) to re-evaluate; there is no hidden global.
pub struct ModelRouter {
    config: Config,
    active: OnceCell<ProviderBackend>,
}

impl ModelRouter {
    /// Creates a router; no provider is constructed until first use.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            active: OnceCell::new(),
        }
    }

    /// Creates a router with a pre-selected backend (tests and custom
    /// composition roots).
    pub fn with_backend(config: Config, backend: ProviderBackend) -> Self {
        Self {
            config,
            active: OnceCell::new_with(Some(backend)),
        }
    }

    /// Returns the active backend, selecting it on first call.
    ///
    /// Fails with [`ProviderError::NoProviderAvailable`] when neither
    /// backend has credentials, before any network call is attempted.
    pub async fn active(&self) -> Result<&ProviderBackend, ProviderError> {
        self.active
            .get_or_try_init(|| async { Self::select(&self.config) })
            .await
    }

    /// Drops the cached selection so the next call re-evaluates.
    pub fn reset(&mut self) {
        self.active = OnceCell::new();
    }

    fn select(config: &Config) -> Result<ProviderBackend, ProviderError> {
        let preferred = config.preferred_provider;

        if Self::is_configured(config, preferred) {
            let backend = Self::construct(config, preferred)?;
            info!(provider = %preferred, "Language model provider selected");
            return Ok(backend);
        }

        let fallback = preferred.other();
        if Self::is_configured(config, fallback) {
            warn!(
                preferred = %preferred,
                fallback = %fallback,
                "Preferred provider is not configured, falling back"
            );
            let backend = Self::construct(config, fallback)?;
            return Ok(backend);
        }

        Err(ProviderError::NoProviderAvailable)
    }

    fn is_configured(config: &Config, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::OpenAi => OpenAiProvider::is_configured(config),
            ProviderKind::Gemini => GeminiProvider::is_configured(config),
        }
    }

    fn construct(config: &Config, kind: ProviderKind) -> Result<ProviderBackend, ProviderError> {
        match kind {
            ProviderKind::OpenAi => Ok(ProviderBackend::OpenAi(OpenAiProvider::new(config)?)),
            ProviderKind::Gemini => Ok(ProviderBackend::Gemini(GeminiProvider::new(config)?)),
        }
    }
}
