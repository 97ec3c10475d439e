//! 提供商注册表
//!
//! Static table of known provider definitions. The table order is the
//! iteration order of the resolver and the insertion order of every
//! resolution result, so it must stay stable.

mod builtin;

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, ErrorContext};
use crate::Result;

pub use builtin::BUILTIN_PROVIDERS;

/// Wire protocol a provider speaks.
///
/// Only the tag is carried here; the protocols themselves live in the client layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiProtocol {
    /// OpenAI Chat Completions (`/v1/chat/completions`) and compatible gateways.
    OpenaiCompletions,
    /// OpenAI Responses API (`/v1/responses`).
    OpenaiResponses,
    /// Anthropic Messages API.
    AnthropicMessages,
    /// Google Generative AI (Gemini).
    GoogleGenerativeAi,
}

impl ApiProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiProtocol::OpenaiCompletions => "openai-completions",
            ApiProtocol::OpenaiResponses => "openai-responses",
            ApiProtocol::AnthropicMessages => "anthropic-messages",
            ApiProtocol::GoogleGenerativeAi => "google-generative-ai",
        }
    }
}

impl fmt::Display for ApiProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a provider the resolver knows how to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefinition {
    pub name: &'static str,
    /// Checked in listed order; the first non-empty variable wins.
    pub env_key_candidates: &'static [&'static str],
    pub base_url: &'static str,
    pub api: ApiProtocol,
}

/// List the built-in provider definitions in registry order.
pub fn list_provider_definitions() -> &'static [ProviderDefinition] {
    BUILTIN_PROVIDERS
}

/// Find a built-in definition by exact provider name.
pub fn find_provider_definition(name: &str) -> Option<&'static ProviderDefinition> {
    BUILTIN_PROVIDERS.iter().find(|def| def.name == name)
}

/// Check the structural invariants of a provider table.
///
/// Names must be unique and non-empty, every entry needs at least one
/// environment key candidate, and base URLs must be absolute http(s) URLs.
pub fn validate_definitions(definitions: &[ProviderDefinition]) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, def) in definitions.iter().enumerate() {
        let field = |name: &str| format!("registry[{}].{}", idx, name);

        if def.name.trim().is_empty() {
            return Err(Error::validation_with_context(
                "provider name must not be empty",
                ErrorContext::new()
                    .with_field_path(field("name"))
                    .with_source("registry"),
            ));
        }
        if !seen.insert(def.name) {
            return Err(Error::validation_with_context(
                format!("duplicate provider name '{}'", def.name),
                ErrorContext::new()
                    .with_field_path(field("name"))
                    .with_source("registry"),
            ));
        }
        if def.env_key_candidates.is_empty()
            || def.env_key_candidates.iter().any(|k| k.trim().is_empty())
        {
            return Err(Error::validation_with_context(
                format!("provider '{}' needs non-empty env key candidates", def.name),
                ErrorContext::new()
                    .with_field_path(field("env_key_candidates"))
                    .with_source("registry"),
            ));
        }
        match url::Url::parse(def.base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(Error::validation_with_context(
                    format!("provider '{}' has unsupported URL scheme", def.name),
                    ErrorContext::new()
                        .with_field_path(field("base_url"))
                        .with_details(format!("scheme '{}'", parsed.scheme()))
                        .with_source("registry"),
                ));
            }
            Err(e) => {
                return Err(Error::validation_with_context(
                    format!("provider '{}' has an invalid base URL", def.name),
                    ErrorContext::new()
                        .with_field_path(field("base_url"))
                        .with_details(e.to_string())
                        .with_source("registry"),
                ));
            }
        }
    }
    Ok(())
}
