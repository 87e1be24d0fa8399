use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or validating configuration.
pub enum ConfigError {
    /// Port could not be parsed as a number.
    #[error("invalid port '{value}': {source}")]
    PortParseError {
        /// Raw environment value.
        value: String,
        /// Parse failure.
        source: ParseIntError,
    },

    /// Port parsed but is outside the usable range.
    #[error("invalid port '{value}': port 0 is not allowed")]
    InvalidPort {
        /// Raw environment value.
        value: String,
    },

    /// Bind address could not be parsed.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        /// Raw environment value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },

    /// Unknown provider name in `FACTLENS_PROVIDER`.
    #[error("unknown provider '{value}': expected 'openai' or 'gemini'")]
    UnknownProvider {
        /// Raw environment value.
        value: String,
    },

    /// A numeric setting is outside its allowed range.
    #[error("{name} must be {requirement}, got {value}")]
    OutOfRange {
        /// Setting name.
        name: &'static str,
        /// Requirement description.
        requirement: &'static str,
        /// Offending value.
        value: String,
    },
}
