//! Credential source adapter.
//!
//! Precedence is an explicit ordered list of probes evaluated short-circuit:
//! environment variables first, then the auth-profile store.

mod probes;

use std::fmt;

use serde::Serialize;

use crate::registry::ProviderDefinition;
use crate::resolver::ResolutionContext;
use crate::store::AuthProfileStore;

pub use probes::{EnvProbe, ProfileProbe};

/// Pointer to where a secret lives. Never the secret itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CredentialReference {
    Env { key: String },
    Profile { id: String },
}

impl CredentialReference {
    pub fn source(&self) -> &'static str {
        match self {
            CredentialReference::Env { .. } => "env",
            CredentialReference::Profile { .. } => "profile",
        }
    }

    /// Stable string form: the variable name or the profile id.
    pub fn as_str(&self) -> &str {
        match self {
            CredentialReference::Env { key } => key,
            CredentialReference::Profile { id } => id,
        }
    }
}

impl fmt::Display for CredentialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found(CredentialReference),
    Missing,
    /// The source could not be consulted; treated as missing by callers.
    Failed(String),
}

/// One credential origin in the precedence chain.
pub trait CredentialProbe: Send + Sync {
    fn source(&self) -> &'static str;

    fn probe(
        &self,
        definition: &ProviderDefinition,
        ctx: &ResolutionContext,
        store: &dyn AuthProfileStore,
    ) -> ProbeOutcome;
}

/// Result of walking the whole chain for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOutcome {
    Resolved(CredentialReference),
    Absent,
    /// Nothing was found and at least one source failed.
    Unavailable { source: &'static str, reason: String },
}

impl CredentialOutcome {
    pub fn reference(&self) -> Option<&CredentialReference> {
        match self {
            CredentialOutcome::Resolved(r) => Some(r),
            _ => None,
        }
    }
}

static DEFAULT_PROBES: [&dyn CredentialProbe; 2] = [&EnvProbe, &ProfileProbe];

/// Probes in precedence order: environment, then profile store.
pub fn default_probes() -> &'static [&'static dyn CredentialProbe] {
    &DEFAULT_PROBES
}

/// Resolve a credential reference using [`default_probes`].
pub fn resolve_credential(
    definition: &ProviderDefinition,
    ctx: &ResolutionContext,
    store: &dyn AuthProfileStore,
) -> CredentialOutcome {
    resolve_credential_with(definition, ctx, store, default_probes())
}

pub fn resolve_credential_with(
    definition: &ProviderDefinition,
    ctx: &ResolutionContext,
    store: &dyn AuthProfileStore,
    probes: &[&dyn CredentialProbe],
) -> CredentialOutcome {
    let mut first_failure = None;
    for probe in probes {
        match probe.probe(definition, ctx, store) {
            ProbeOutcome::Found(reference) => return CredentialOutcome::Resolved(reference),
            ProbeOutcome::Missing => {}
            ProbeOutcome::Failed(reason) => {
                first_failure.get_or_insert((probe.source(), reason));
            }
        }
    }
    match first_failure {
        Some((source, reason)) => CredentialOutcome::Unavailable { source, reason },
        None => CredentialOutcome::Absent,
    }
}
