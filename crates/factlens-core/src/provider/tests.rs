use std::sync::Arc;

use super::*;
use crate::config::{Config, ProviderKind};

fn config_with_keys(openai: Option<&str>, gemini: Option<&str>) -> Config {
    Config {
        openai_api_key: openai.map(str::to_string),
        gemini_api_key: gemini.map(str::to_string),
        ..Default::default()
    }
}

#[tokio::test]
async fn router_prefers_configured_provider() {
    let config = config_with_keys(Some("sk-test"), Some("g-test"));
    let router = ModelRouter::new(config);

    let backend = router.active().await.expect("provider available");
    assert_eq!(backend.kind(), ProviderKind::Gemini);
}

#[tokio::test]
async fn router_honors_openai_preference() {
    let config = Config {
        preferred_provider: ProviderKind::OpenAi,
        ..config_with_keys(Some("sk-test"), Some("g-test"))
    };
    let router = ModelRouter::new(config);

    let backend = router.active().await.expect("provider available");
    assert_eq!(backend.kind(), ProviderKind::OpenAi);
}

#[tokio::test]
async fn router_falls_back_to_single_configured_provider() {
    // Gemini preferred but only OpenAI has a key.
    let config = config_with_keys(Some("sk-test"), None);
    let router = ModelRouter::new(config);

    let backend = router.active().await.expect("fallback available");
    assert_eq!(backend.kind(), ProviderKind::OpenAi);
}

#[tokio::test]
async fn router_fails_with_no_provider_before_any_call() {
    let config = config_with_keys(None, None);
    let router = ModelRouter::new(config);

    let err = router.active().await.expect_err("nothing configured");
    assert!(matches!(err, ProviderError::NoProviderAvailable));
}

#[tokio::test]
async fn router_caches_selection_until_reset() {
    let config = config_with_keys(None, Some("g-test"));
    let mut router = ModelRouter::new(config);

    let first = router.active().await.expect("selected").kind();
    let second = router.active().await.expect("cached").kind();
    assert_eq!(first, second);

    router.reset();
    let third = router.active().await.expect("re-selected").kind();
    assert_eq!(first, third);
}

#[tokio::test]
async fn router_concurrent_first_access_converges() {
    let config = config_with_keys(None, Some("g-test"));
    let router = Arc::new(ModelRouter::new(config));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let router = Arc::clone(&router);
            tokio::spawn(async move { router.active().await.map(|b| b.kind()) })
        })
        .collect();

    for handle in handles {
        let kind = handle.await.unwrap().expect("selection succeeds");
        assert_eq!(kind, ProviderKind::Gemini);
    }
}

#[test]
fn provider_construction_fails_fast_without_credentials() {
    let config = config_with_keys(None, None);

    assert!(matches!(
        OpenAiProvider::new(&config),
        Err(ProviderError::NotConfigured {
            provider: "openai",
            ..
        })
    ));
    assert!(matches!(
        GeminiProvider::new(&config),
        Err(ProviderError::NotConfigured {
            provider: "gemini",
            ..
        })
    ));
}

#[tokio::test]
async fn mock_provider_embeddings_are_deterministic() {
    let mock = MockProvider::new(8);
    let texts = vec!["alpha".to_string(), "beta".to_string()];

    let a = mock.embed_batch(&texts, None).await.unwrap();
    let b = mock.embed_batch(&texts, None).await.unwrap();

    assert_eq!(a.vectors, b.vectors);
    assert_eq!(a.vectors.len(), 2);
    assert_eq!(a.vectors[0].len(), 8);
    assert_ne!(a.vectors[0], a.vectors[1]);
}

#[tokio::test]
async fn mock_provider_completions_pop_in_order() {
    let mock = MockProvider::new(4);
    mock.push_completion("first");
    mock.push_completion("second");

    assert_eq!(mock.complete("p", None).await.unwrap(), "first");
    assert_eq!(mock.complete("p", None).await.unwrap(), "second");
    assert!(matches!(
        mock.complete("p", None).await,
        Err(ProviderError::EmptyResponse { .. })
    ));
}
