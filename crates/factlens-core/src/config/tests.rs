use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_factlens_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("FACTLENS_PORT");
        env::remove_var("FACTLENS_BIND_ADDR");
        env::remove_var("FACTLENS_QDRANT_URL");
        env::remove_var("FACTLENS_COLLECTION");
        env::remove_var("FACTLENS_PROVIDER");
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("GEMINI_API_KEY");
        env::remove_var("FACTLENS_EMBEDDING_MODEL");
        env::remove_var("FACTLENS_EMBEDDING_DIM");
        env::remove_var("FACTLENS_COMPLETION_MODEL");
        env::remove_var("FACTLENS_TOP_K");
        env::remove_var("FACTLENS_MIN_CREDIBILITY");
        env::remove_var("FACTLENS_REQUEST_TIMEOUT_SECS");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.qdrant_url, "http://localhost:6334");
    assert_eq!(config.collection_name, "news_articles");
    assert_eq!(config.preferred_provider, ProviderKind::Gemini);
    assert!(config.openai_api_key.is_none());
    assert!(config.gemini_api_key.is_none());
    assert_eq!(config.embedding_dim, 1536);
    assert_eq!(config.top_k, 10);
    assert_eq!(config.min_credibility, 0.6);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_factlens_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.preferred_provider, ProviderKind::Gemini);
    assert!(config.completion_model.is_none());
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_factlens_env();

    with_env_vars(&[("FACTLENS_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_invalid_port() {
    clear_factlens_env();

    with_env_vars(&[("FACTLENS_PORT", "not-a-port")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::PortParseError { .. })
        ));
    });

    with_env_vars(&[("FACTLENS_PORT", "0")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidPort { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_provider_selection() {
    clear_factlens_env();

    with_env_vars(&[("FACTLENS_PROVIDER", "openai")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.preferred_provider, ProviderKind::OpenAi);
    });

    with_env_vars(&[("FACTLENS_PROVIDER", "GEMINI")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.preferred_provider, ProviderKind::Gemini);
    });

    with_env_vars(&[("FACTLENS_PROVIDER", "claude")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::UnknownProvider { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_blank_api_key_is_unset() {
    clear_factlens_env();

    with_env_vars(&[("OPENAI_API_KEY", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.openai_api_key.is_none());
    });

    with_env_vars(&[("OPENAI_API_KEY", "sk-test")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    });
}

#[test]
fn test_validate_rejects_bad_ranges() {
    let config = Config {
        embedding_dim: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { name: "embedding_dim", .. })
    ));

    let config = Config {
        top_k: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        min_credibility: 1.5,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        request_timeout_secs: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_provider_kind_other() {
    assert_eq!(ProviderKind::OpenAi.other(), ProviderKind::Gemini);
    assert_eq!(ProviderKind::Gemini.other(), ProviderKind::OpenAi);
    assert_eq!(ProviderKind::Gemini.to_string(), "gemini");
}
