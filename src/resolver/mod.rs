//! 隐式提供商解析
//!
//! Implicit provider resolution: probe every registry entry for a credential
//! and build a config for each provider that has one.
//!
//! Resolution never fails because a provider is unusable or because a
//! credential source is broken. The only error is a caller-contract violation
//! (an agent directory that is not absolute).

mod assemble;
mod context;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::credentials::{resolve_credential, CredentialOutcome};
use crate::error::{Error, ErrorContext};
use crate::registry::{list_provider_definitions, ProviderDefinition};
use crate::store::{ensure_store, AuthProfileStore};
use crate::Result;

pub use assemble::{
    assemble, OmissionReason, ProviderOutcome, ResolutionResult, ResolvedProviderConfig,
};
pub use context::{ResolutionContext, ResolveOptions};

static WARNED_SOURCES: Lazy<Mutex<HashSet<(String, String)>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

/// Warn about a failing source once per `(provider, source)` per process.
///
/// Returns `true` when the warning was emitted; repeats go to `debug`.
fn warn_source_failure_once(provider: &str, source: &str, reason: &str) -> bool {
    let first = WARNED_SOURCES
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert((provider.to_string(), source.to_string()));
    if first {
        tracing::warn!(
            provider,
            source,
            reason,
            "credential source unavailable; treating provider as unconfigured"
        );
    } else {
        tracing::debug!(provider, source, reason, "credential source unavailable");
    }
    first
}

/// Probe one provider. Never fails; problems become an omission.
pub fn resolve_provider(
    definition: &ProviderDefinition,
    ctx: &ResolutionContext,
    store: &dyn AuthProfileStore,
) -> ProviderOutcome {
    match resolve_credential(definition, ctx, store) {
        CredentialOutcome::Resolved(credential) => {
            tracing::debug!(
                provider = definition.name,
                source = credential.source(),
                reference = %credential,
                "resolved provider"
            );
            ProviderOutcome::Resolved(ResolvedProviderConfig::from_definition(
                definition, credential,
            ))
        }
        CredentialOutcome::Absent => {
            tracing::debug!(provider = definition.name, "no credential found");
            ProviderOutcome::Omitted {
                name: definition.name.to_string(),
                reason: OmissionReason::NoCredential,
            }
        }
        CredentialOutcome::Unavailable { source, reason } => {
            warn_source_failure_once(definition.name, source, &reason);
            ProviderOutcome::Omitted {
                name: definition.name.to_string(),
                reason: OmissionReason::SourceFailed {
                    source: source.to_string(),
                    reason,
                },
            }
        }
    }
}

/// Per-provider outcomes for the built-in registry, omissions included.
pub fn explain_implicit_providers(options: &ResolveOptions) -> Result<Vec<ProviderOutcome>> {
    let ctx = ResolutionContext::new(options)?;
    let store = ensure_store(ctx.agent_dir(), &ctx.store_options());
    Ok(list_provider_definitions()
        .iter()
        .map(|def| resolve_provider(def, &ctx, &store))
        .collect())
}

/// Discover usable providers for `options.agent_dir`.
///
/// # Example
///
/// ```rust,no_run
/// use ai_provider_resolver::{resolve_implicit_providers, Environment, ResolveOptions};
///
/// let env = Environment::from_pairs([("OPENROUTER_API_KEY", "sk-test-key")]);
/// let providers = resolve_implicit_providers(
///     &ResolveOptions::new("/tmp/test-agent").with_environment(env),
/// )?;
/// assert_eq!(providers.get("openrouter").unwrap().api_key, "OPENROUTER_API_KEY");
/// # Ok::<(), ai_provider_resolver::Error>(())
/// ```
pub fn resolve_implicit_providers(options: &ResolveOptions) -> Result<ResolutionResult> {
    let ctx = ResolutionContext::new(options)?;
    let store = ensure_store(ctx.agent_dir(), &ctx.store_options());
    resolve_implicit_providers_with(&ctx, list_provider_definitions(), &store)
}

/// Fully injected variant: custom registry table and store.
///
/// A store that reports `Errored` only omits the affected provider. A store
/// that panics is not caught here and unwinds out of the call; use
/// [`resolve_implicit_providers_concurrent_with`] to contain panics per provider.
pub fn resolve_implicit_providers_with(
    ctx: &ResolutionContext,
    definitions: &[ProviderDefinition],
    store: &dyn AuthProfileStore,
) -> Result<ResolutionResult> {
    assemble(
        definitions
            .iter()
            .map(|def| resolve_provider(def, ctx, store)),
    )
}

/// Like [`resolve_implicit_providers`], but probes providers in parallel on the
/// blocking pool. A keychain prompt may block, so probes never run on the
/// async workers. Output order is still registry order.
pub async fn resolve_implicit_providers_concurrent(
    options: &ResolveOptions,
) -> Result<ResolutionResult> {
    let ctx = Arc::new(ResolutionContext::new(options)?);

    let agent_dir = ctx.agent_dir().to_path_buf();
    let store_options = ctx.store_options();
    let store = tokio::task::spawn_blocking(move || ensure_store(&agent_dir, &store_options))
        .await
        .map_err(|e| {
            Error::runtime_with_context(
                "auth profile store loader stopped unexpectedly",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("resolver"),
            )
        })?;

    resolve_implicit_providers_concurrent_with(ctx, list_provider_definitions(), Arc::new(store))
        .await
}

pub async fn resolve_implicit_providers_concurrent_with(
    ctx: Arc<ResolutionContext>,
    definitions: &[ProviderDefinition],
    store: Arc<dyn AuthProfileStore>,
) -> Result<ResolutionResult> {
    let tasks = definitions.iter().copied().map(|def| {
        let ctx = Arc::clone(&ctx);
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || resolve_provider(&def, &ctx, store.as_ref()))
    });
    let joined = futures::future::join_all(tasks).await;

    let outcomes = definitions.iter().zip(joined).map(|(def, joined)| match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            let reason = e.to_string();
            warn_source_failure_once(def.name, "task", &reason);
            ProviderOutcome::Omitted {
                name: def.name.to_string(),
                reason: OmissionReason::SourceFailed {
                    source: "task".to_string(),
                    reason,
                },
            }
        }
    });
    assemble(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use crate::env::Environment;
    use crate::registry::ApiProtocol;
    use crate::store::{ProfileLookup, StoreError};

    struct EmptyStore;

    impl AuthProfileStore for EmptyStore {
        fn lookup(&self, _provider: &str) -> ProfileLookup {
            ProfileLookup::NotFound
        }
    }

    struct ErroredStore;

    impl AuthProfileStore for ErroredStore {
        fn lookup(&self, _provider: &str) -> ProfileLookup {
            ProfileLookup::Errored(StoreError::Parse {
                path: "auth-profiles.json".to_string(),
                message: "expected value".to_string(),
            })
        }
    }

    struct Exploding;

    impl AuthProfileStore for Exploding {
        fn lookup(&self, provider: &str) -> ProfileLookup {
            panic!("store exploded for {provider}");
        }
    }

    /// Counts `WARN` events seen by the scoped subscriber.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    const TABLE: &[ProviderDefinition] = &[
        ProviderDefinition {
            name: "alpha",
            env_key_candidates: &["ALPHA_KEY"],
            base_url: "https://alpha.example.com/v1",
            api: ApiProtocol::OpenaiCompletions,
        },
        ProviderDefinition {
            name: "beta",
            env_key_candidates: &["BETA_KEY", "BETA_TOKEN"],
            base_url: "https://beta.example.com",
            api: ApiProtocol::AnthropicMessages,
        },
    ];

    fn ctx(pairs: &[(&str, &str)]) -> ResolutionContext {
        ResolutionContext::new(
            &ResolveOptions::new(std::env::temp_dir())
                .with_environment(Environment::from_pairs(pairs.iter().copied())),
        )
        .unwrap()
    }

    #[test]
    fn custom_table_resolution() {
        let result =
            resolve_implicit_providers_with(&ctx(&[("BETA_TOKEN", "t")]), TABLE, &EmptyStore)
                .unwrap();
        assert_eq!(result.len(), 1);
        let beta = result.get("beta").unwrap();
        assert_eq!(beta.api_key, "BETA_TOKEN");
        assert_eq!(beta.base_url, "https://beta.example.com");
        assert_eq!(beta.api, ApiProtocol::AnthropicMessages);
    }

    #[test]
    fn outcomes_record_omissions() {
        let ctx = ctx(&[("ALPHA_KEY", "a")]);
        let outcomes: Vec<_> = TABLE
            .iter()
            .map(|def| resolve_provider(def, &ctx, &EmptyStore))
            .collect();
        assert!(matches!(outcomes[0], ProviderOutcome::Resolved(_)));
        assert_eq!(
            outcomes[1],
            ProviderOutcome::Omitted {
                name: "beta".to_string(),
                reason: OmissionReason::NoCredential
            }
        );
    }

    #[test]
    fn concurrent_matches_sequential() {
        let ctx = ctx(&[("ALPHA_KEY", "a"), ("BETA_KEY", "b")]);
        let sequential = resolve_implicit_providers_with(&ctx, TABLE, &EmptyStore).unwrap();
        let concurrent = tokio_test::block_on(resolve_implicit_providers_concurrent_with(
            Arc::new(ctx),
            TABLE,
            Arc::new(EmptyStore),
        ))
        .unwrap();
        assert_eq!(sequential, concurrent);
    }

    #[test]
    fn source_failures_warn_once_per_provider_and_source() {
        let first = ProviderDefinition {
            name: "warn-once-first",
            env_key_candidates: &["WARN_ONCE_FIRST_KEY"],
            base_url: "https://first.example.com",
            api: ApiProtocol::OpenaiCompletions,
        };
        let second = ProviderDefinition {
            name: "warn-once-second",
            env_key_candidates: &["WARN_ONCE_SECOND_KEY"],
            base_url: "https://second.example.com",
            api: ApiProtocol::OpenaiCompletions,
        };
        let ctx = ctx(&[]);
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));

        tracing::subscriber::with_default(subscriber, || {
            let outcome = resolve_provider(&first, &ctx, &ErroredStore);
            assert!(matches!(
                outcome,
                ProviderOutcome::Omitted {
                    reason: OmissionReason::SourceFailed { .. },
                    ..
                }
            ));
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            resolve_provider(&first, &ctx, &ErroredStore);
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            resolve_provider(&second, &ctx, &ErroredStore);
            resolve_provider(&second, &ctx, &ErroredStore);
            assert_eq!(warnings.load(Ordering::SeqCst), 2);
        });

        assert!(!warn_source_failure_once("warn-once-first", "profile", "again"));
        assert!(warn_source_failure_once("warn-once-first", "keychain", "new source"));
    }

    #[test]
    #[should_panic(expected = "store exploded")]
    fn sequential_path_lets_store_panics_unwind() {
        let _ = resolve_implicit_providers_with(&ctx(&[]), TABLE, &Exploding);
    }

    #[test]
    fn concurrent_path_contains_store_panics() {
        let ctx = ctx(&[("BETA_KEY", "b")]);
        let result = tokio_test::block_on(resolve_implicit_providers_concurrent_with(
            Arc::new(ctx),
            TABLE,
            Arc::new(Exploding),
        ))
        .unwrap();
        assert_eq!(result.names().collect::<Vec<_>>(), vec!["beta"]);
    }
}
