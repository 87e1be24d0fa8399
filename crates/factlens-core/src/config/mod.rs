//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `FACTLENS_*` environment
//! variables; provider credentials use their conventional names
//! (`OPENAI_API_KEY`, `GEMINI_API_KEY`).

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;

/// Which language-model backend the router should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI embeddings + chat completions.
    OpenAi,
    /// Google Generative Language API.
    Gemini,
}

impl ProviderKind {
    /// Stable lowercase name used in config and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// The other provider, used for fallback selection.
    pub fn other(&self) -> ProviderKind {
        match self {
            ProviderKind::OpenAi => ProviderKind::Gemini,
            ProviderKind::Gemini => ProviderKind::OpenAi,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default Qdrant URL used when `FACTLENS_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Collection holding all indexed article vectors. Shared by every process
/// pointed at the same Qdrant instance.
pub const DEFAULT_COLLECTION_NAME: &str = "news_articles";

/// Default embedding model and its dimension.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Dimension of [`DEFAULT_EMBEDDING_MODEL`] vectors.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Evidence below this credibility never reaches verdict synthesis.
pub const DEFAULT_MIN_CREDIBILITY: f64 = 0.6;

/// Default number of evidence candidates retrieved per claim.
pub const DEFAULT_TOP_K: u64 = 10;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FACTLENS_*` overrides on top of
/// defaults, then [`Config::validate`] before wiring services.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Vector collection name. Default: `news_articles`.
    pub collection_name: String,

    /// Preferred language-model provider. Default: Gemini.
    pub preferred_provider: ProviderKind,

    /// OpenAI API key, if configured.
    pub openai_api_key: Option<String>,

    /// Gemini API key, if configured.
    pub gemini_api_key: Option<String>,

    /// Embedding model identifier. Default: `text-embedding-3-small`.
    pub embedding_model: String,

    /// Dimension of the embedding model's vectors. Default: `1536`.
    pub embedding_dim: usize,

    /// Completion model override. `None` uses the provider's default.
    pub completion_model: Option<String>,

    /// Evidence candidates retrieved per claim. Default: `10`.
    pub top_k: u64,

    /// Credibility floor applied to every evidence query. Default: `0.6`.
    pub min_credibility: f64,

    /// Timeout for each outbound provider call, in seconds. Default: `30`.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            preferred_provider: ProviderKind::Gemini,
            openai_api_key: None,
            gemini_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            completion_model: None,
            top_k: DEFAULT_TOP_K,
            min_credibility: DEFAULT_MIN_CREDIBILITY,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "FACTLENS_PORT";
    const ENV_BIND_ADDR: &'static str = "FACTLENS_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "FACTLENS_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "FACTLENS_COLLECTION";
    const ENV_PROVIDER: &'static str = "FACTLENS_PROVIDER";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_GEMINI_API_KEY: &'static str = "GEMINI_API_KEY";
    const ENV_EMBEDDING_MODEL: &'static str = "FACTLENS_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "FACTLENS_EMBEDDING_DIM";
    const ENV_COMPLETION_MODEL: &'static str = "FACTLENS_COMPLETION_MODEL";
    const ENV_TOP_K: &'static str = "FACTLENS_TOP_K";
    const ENV_MIN_CREDIBILITY: &'static str = "FACTLENS_MIN_CREDIBILITY";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "FACTLENS_REQUEST_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let collection_name =
            Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection_name);
        let preferred_provider = Self::parse_provider_from_env(defaults.preferred_provider)?;
        let openai_api_key = Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY);
        let gemini_api_key = Self::parse_optional_string_from_env(Self::ENV_GEMINI_API_KEY);
        let embedding_model =
            Self::parse_string_from_env(Self::ENV_EMBEDDING_MODEL, defaults.embedding_model);
        let embedding_dim =
            Self::parse_u64_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim as u64)
                as usize;
        let completion_model = Self::parse_optional_string_from_env(Self::ENV_COMPLETION_MODEL);
        let top_k = Self::parse_u64_from_env(Self::ENV_TOP_K, defaults.top_k);
        let min_credibility =
            Self::parse_f64_from_env(Self::ENV_MIN_CREDIBILITY, defaults.min_credibility);
        let request_timeout_secs = Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout_secs,
        );

        Ok(Self {
            port,
            bind_addr,
            qdrant_url,
            collection_name,
            preferred_provider,
            openai_api_key,
            gemini_api_key,
            embedding_model,
            embedding_dim,
            completion_model,
            top_k,
            min_credibility,
            request_timeout_secs,
        })
    }

    /// Validates basic invariants. Does not touch the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::OutOfRange {
                name: "embedding_dim",
                requirement: "greater than zero",
                value: self.embedding_dim.to_string(),
            });
        }

        if self.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: "top_k",
                requirement: "greater than zero",
                value: self.top_k.to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.min_credibility) {
            return Err(ConfigError::OutOfRange {
                name: "min_credibility",
                requirement: "within [0, 1]",
                value: self.min_credibility.to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                name: "request_timeout_secs",
                requirement: "greater than zero",
                value: self.request_timeout_secs.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_provider_from_env(default: ProviderKind) -> Result<ProviderKind, ConfigError> {
        match env::var(Self::ENV_PROVIDER) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "openai" => Ok(ProviderKind::OpenAi),
                "gemini" => Ok(ProviderKind::Gemini),
                _ => Err(ConfigError::UnknownProvider { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_f64_from_env(var_name: &str, default: f64) -> f64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
