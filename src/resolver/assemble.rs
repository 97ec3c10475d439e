//! Merges per-provider outcomes into the final mapping.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::credentials::CredentialReference;
use crate::error::{Error, ErrorContext};
use crate::registry::{ApiProtocol, ProviderDefinition};
use crate::Result;

/// Normalized configuration for one usable provider.
///
/// `api_key` is a reference (variable name or profile id), so the value is safe
/// to log and serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProviderConfig {
    #[serde(skip)]
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    pub api: ApiProtocol,
    #[serde(skip)]
    pub credential: CredentialReference,
}

impl ResolvedProviderConfig {
    pub fn from_definition(
        definition: &ProviderDefinition,
        credential: CredentialReference,
    ) -> Self {
        Self {
            name: definition.name.to_string(),
            base_url: definition.base_url.to_string(),
            api_key: credential.to_string(),
            api: definition.api,
            credential,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmissionReason {
    NoCredential,
    /// A credential source failed; recovered as "no credential".
    SourceFailed { source: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Resolved(ResolvedProviderConfig),
    Omitted { name: String, reason: OmissionReason },
}

impl ProviderOutcome {
    pub fn name(&self) -> &str {
        match self {
            ProviderOutcome::Resolved(config) => &config.name,
            ProviderOutcome::Omitted { name, .. } => name,
        }
    }
}

/// Provider name to config, in registry order.
///
/// Built fresh on every resolution call and owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    entries: Vec<ResolvedProviderConfig>,
}

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a config; duplicate names are rejected.
    pub fn insert(&mut self, config: ResolvedProviderConfig) -> Result<()> {
        if self.contains(&config.name) {
            return Err(Error::validation_with_context(
                format!("provider '{}' resolved twice", config.name),
                ErrorContext::new()
                    .with_field_path(config.name.clone())
                    .with_source("assembler"),
            ));
        }
        self.entries.push(config);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedProviderConfig> {
        self.entries.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedProviderConfig> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }

    pub fn into_configs(self) -> Vec<ResolvedProviderConfig> {
        self.entries
    }

    /// Pretty-printed `{ name: { baseUrl, apiKey, api } }` object.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl IntoIterator for ResolutionResult {
    type Item = ResolvedProviderConfig;
    type IntoIter = std::vec::IntoIter<ResolvedProviderConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ResolutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for config in &self.entries {
            map.serialize_entry(&config.name, config)?;
        }
        map.end()
    }
}

/// Keep resolved providers in outcome order and drop omitted ones.
pub fn assemble(outcomes: impl IntoIterator<Item = ProviderOutcome>) -> Result<ResolutionResult> {
    let mut result = ResolutionResult::new();
    for outcome in outcomes {
        if let ProviderOutcome::Resolved(config) = outcome {
            result.insert(config)?;
        }
    }
    Ok(result)
}
