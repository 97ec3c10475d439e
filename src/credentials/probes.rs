use crate::env::{log_accepted_env_option, AcceptedEnvOption};
use crate::registry::ProviderDefinition;
use crate::resolver::ResolutionContext;
use crate::store::{AuthProfileStore, ProfileLookup};

use super::{CredentialProbe, CredentialReference, ProbeOutcome};

/// Environment variables, in the definition's candidate order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProbe;

impl CredentialProbe for EnvProbe {
    fn source(&self) -> &'static str {
        "env"
    }

    fn probe(
        &self,
        definition: &ProviderDefinition,
        ctx: &ResolutionContext,
        _store: &dyn AuthProfileStore,
    ) -> ProbeOutcome {
        let env = ctx.environment();
        let Some((key, value)) = definition
            .env_key_candidates
            .iter()
            .find_map(|key| env.get_non_empty(key).map(|value| (*key, value)))
        else {
            return ProbeOutcome::Missing;
        };

        log_accepted_env_option(AcceptedEnvOption {
            key,
            description: "provider API key",
            value: Some(value),
            redact: true,
        });
        ProbeOutcome::Found(CredentialReference::Env {
            key: key.to_string(),
        })
    }
}

/// The agent-scoped auth-profile store.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileProbe;

impl CredentialProbe for ProfileProbe {
    fn source(&self) -> &'static str {
        "profile"
    }

    fn probe(
        &self,
        definition: &ProviderDefinition,
        _ctx: &ResolutionContext,
        store: &dyn AuthProfileStore,
    ) -> ProbeOutcome {
        match store.lookup(definition.name) {
            ProfileLookup::Found(profile) => {
                tracing::debug!(
                    provider = definition.name,
                    profile = %profile.id,
                    kind = %profile.kind,
                    "matched auth profile"
                );
                ProbeOutcome::Found(CredentialReference::Profile { id: profile.id })
            }
            ProfileLookup::NotFound => ProbeOutcome::Missing,
            ProfileLookup::Errored(err) => ProbeOutcome::Failed(err.to_string()),
        }
    }
}
