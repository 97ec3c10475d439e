//! Authentication-profile store access.
//!
//! The resolver only ever reads from the store, through the narrow
//! [`AuthProfileStore`] trait. Lookups report where a credential lives, never
//! the secret itself.

mod file;
mod keychain;

use std::fmt;
use std::path::Path;

use serde::Serialize;

pub use file::{FileProfileStore, AUTH_PROFILES_FILE, LEGACY_AUTH_FILE};
pub use keychain::{KeychainAccess, OsKeychain};

/// How a stored profile authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    ApiKey,
    Token,
    #[serde(rename = "oauth")]
    OAuth,
    /// Secret held by the OS keychain, addressed by service/account.
    Keychain,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialKind::ApiKey => "api_key",
            CredentialKind::Token => "token",
            CredentialKind::OAuth => "oauth",
            CredentialKind::Keychain => "keychain",
        };
        f.write_str(s)
    }
}

/// A usable profile matched for a provider. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCredential {
    pub id: String,
    pub provider: String,
    pub kind: CredentialKind,
}

/// Store lookup outcome.
///
/// `Errored` stays distinguishable from `NotFound` even though the resolver
/// treats both as "no credential".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(ProfileCredential),
    NotFound,
    Errored(StoreError),
}

impl ProfileLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, ProfileLookup::Found(_))
    }
}

/// Failures while reading the store. Never propagated past the resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("profile '{id}' is malformed: {message}")]
    MalformedProfile { id: String, message: String },

    #[error("keychain access failed for profile '{id}': {message}")]
    Keychain { id: String, message: String },
}

/// Read-only view of the agent-scoped authentication-profile store.
pub trait AuthProfileStore: Send + Sync {
    /// Find a usable profile for `provider`.
    fn lookup(&self, provider: &str) -> ProfileLookup;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Permit lookups that may block on an interactive keychain prompt.
    pub allow_keychain_prompt: bool,
}

/// Open the store scoped to `agent_dir`.
///
/// Never fails and never writes: a missing directory yields an empty store, and
/// unreadable data yields a store whose lookups report `Errored`.
pub fn ensure_store(agent_dir: &Path, options: &StoreOptions) -> FileProfileStore {
    FileProfileStore::load(agent_dir, *options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_kind_labels() {
        assert_eq!(CredentialKind::OAuth.to_string(), "oauth");
        assert_eq!(
            serde_json::to_value(CredentialKind::OAuth).unwrap(),
            serde_json::json!("oauth")
        );
        assert_eq!(
            serde_json::to_value(CredentialKind::ApiKey).unwrap(),
            serde_json::json!("api_key")
        );
    }

    #[test]
    fn missing_agent_dir_gives_empty_store() {
        let dir = std::env::temp_dir().join("ai-provider-resolver-does-not-exist-7f3a");
        let store = ensure_store(&dir, &StoreOptions::default());
        assert_eq!(store.lookup("openrouter"), ProfileLookup::NotFound);
        assert!(!dir.exists());
    }
}
