//! Parallel resolution on the tokio blocking pool.

use std::sync::Arc;

use ai_provider_resolver::resolver::resolve_implicit_providers_concurrent_with;
use ai_provider_resolver::{
    list_provider_definitions, resolve_implicit_providers, resolve_implicit_providers_concurrent,
    AuthProfileStore, Environment, ProfileLookup, ResolutionContext, ResolveOptions,
};
use serde_json::json;

fn options(dir: &std::path::Path, pairs: &[(&str, &str)]) -> ResolveOptions {
    ResolveOptions::new(dir).with_environment(Environment::from_pairs(pairs.iter().copied()))
}

/// Panics when asked about one provider.
struct PanicsFor(&'static str);

impl AuthProfileStore for PanicsFor {
    fn lookup(&self, provider: &str) -> ProfileLookup {
        if provider == self.0 {
            panic!("store exploded for {provider}");
        }
        ProfileLookup::NotFound
    }
}

#[tokio::test]
async fn test_concurrent_matches_sequential() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("auth-profiles.json"),
        json!({
            "profiles": {
                "fireworks:default": {"type": "api_key", "provider": "fireworks", "key": "fw"}
            }
        })
        .to_string(),
    )
    .unwrap();
    let opts = options(
        tmp.path(),
        &[("OPENAI_API_KEY", "o"), ("TOGETHER_AI_API_KEY", "t")],
    );

    let sequential = resolve_implicit_providers(&opts).unwrap();
    let concurrent = resolve_implicit_providers_concurrent(&opts).await.unwrap();

    assert_eq!(sequential, concurrent);
    assert_eq!(
        concurrent.names().collect::<Vec<_>>(),
        vec!["openai", "togetherai", "fireworks"]
    );
    assert_eq!(concurrent.get("togetherai").unwrap().api_key, "TOGETHER_AI_API_KEY");
}

#[tokio::test]
async fn test_panicking_probe_is_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = ResolutionContext::new(&options(tmp.path(), &[("OPENROUTER_API_KEY", "k")])).unwrap();

    let result = resolve_implicit_providers_concurrent_with(
        Arc::new(ctx),
        list_provider_definitions(),
        Arc::new(PanicsFor("anthropic")),
    )
    .await
    .unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), vec!["openrouter"]);
}

#[tokio::test]
async fn test_parallel_calls_agree() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(
        tmp.path(),
        &[("GROQ_API_KEY", "g"), ("MOONSHOT_API_KEY", "m")],
    );

    let calls = (0..8).map(|_| resolve_implicit_providers_concurrent(&opts));
    let results = futures::future::join_all(calls).await;

    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_concurrent_rejects_relative_dir() {
    let err = resolve_implicit_providers_concurrent(&ResolveOptions::new("agent"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("absolute"));
}
