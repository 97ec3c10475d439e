//! File-backed profile store: `<agentDir>/auth-profiles.json`, with a
//! fallback to the legacy per-provider `auth.json`.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde_json::Value;

use super::keychain::{KeychainAccess, OsKeychain};
use super::{
    AuthProfileStore, CredentialKind, ProfileCredential, ProfileLookup, StoreError, StoreOptions,
};

pub const AUTH_PROFILES_FILE: &str = "auth-profiles.json";
pub const LEGACY_AUTH_FILE: &str = "auth.json";

#[derive(Debug, Default, Deserialize)]
struct AuthProfilesFile {
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<u32>,
    #[serde(default)]
    profiles: BTreeMap<String, Value>,
    #[serde(default)]
    order: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum StoredCredential {
    #[serde(rename = "api_key")]
    ApiKey {
        #[serde(default)]
        key: Option<String>,
    },
    #[serde(rename = "token")]
    Token {
        #[serde(default)]
        token: Option<String>,
        /// Unix ms
        #[serde(default)]
        expires: Option<i64>,
    },
    #[serde(rename = "oauth")]
    OAuth {
        #[serde(default)]
        access: Option<String>,
        #[serde(default)]
        refresh: Option<String>,
        #[serde(default)]
        #[allow(dead_code)]
        expires: Option<i64>,
    },
    #[serde(rename = "keychain")]
    Keychain { service: String, account: String },
}

/// Legacy `auth.json` entries, keyed by provider.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LegacyCredential {
    ApiKey {
        key: String,
    },
    #[serde(rename = "oauth")]
    OAuth {
        access_token: String,
        #[serde(default)]
        refresh_token: Option<String>,
        #[serde(default)]
        expires: Option<i64>,
    },
}

impl From<LegacyCredential> for StoredCredential {
    fn from(legacy: LegacyCredential) -> Self {
        match legacy {
            LegacyCredential::ApiKey { key } => StoredCredential::ApiKey { key: Some(key) },
            LegacyCredential::OAuth {
                access_token,
                refresh_token,
                expires,
            } => StoredCredential::OAuth {
                access: Some(access_token),
                refresh: refresh_token,
                expires,
            },
        }
    }
}

#[derive(Debug, Clone)]
enum ProfileBody {
    Parsed(StoredCredential),
    Malformed(String),
}

#[derive(Debug, Clone)]
struct StoredProfile {
    id: String,
    provider: String,
    body: ProfileBody,
}

#[derive(Debug, Clone)]
enum StoreState {
    Loaded {
        profiles: BTreeMap<String, StoredProfile>,
        order: BTreeMap<String, Vec<String>>,
    },
    Poisoned(StoreError),
}

/// Profile store read once from the agent directory.
///
/// Holds only what it read at construction, so lookups are `&self` and safe to
/// run concurrently.
#[derive(Clone)]
pub struct FileProfileStore {
    agent_dir: PathBuf,
    options: StoreOptions,
    state: StoreState,
    keychain: Arc<dyn KeychainAccess>,
    loaded_at_ms: i64,
}

impl fmt::Debug for FileProfileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileProfileStore")
            .field("agent_dir", &self.agent_dir)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FileProfileStore {
    pub fn load(agent_dir: &Path, options: StoreOptions) -> Self {
        let state = read_state(agent_dir);
        if let StoreState::Poisoned(ref err) = state {
            tracing::debug!(
                agent_dir = %agent_dir.display(),
                error = %err,
                "auth profile store unreadable"
            );
        }
        Self {
            agent_dir: agent_dir.to_path_buf(),
            options,
            state,
            keychain: Arc::new(OsKeychain),
            loaded_at_ms: now_ms(),
        }
    }

    /// Replace the keychain backend (tests, or hosts with their own secret service).
    pub fn with_keychain(mut self, keychain: Arc<dyn KeychainAccess>) -> Self {
        self.keychain = keychain;
        self
    }

    /// Whether reading the store failed outright.
    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, StoreState::Poisoned(_))
    }

    /// Number of profiles read, malformed ones included.
    pub fn profile_count(&self) -> usize {
        match &self.state {
            StoreState::Loaded { profiles, .. } => profiles.len(),
            StoreState::Poisoned(_) => 0,
        }
    }

    /// Whether a stored credential can serve requests right now.
    fn is_usable(
        &self,
        profile: &StoredProfile,
        credential: &StoredCredential,
    ) -> Result<bool, StoreError> {
        let non_blank = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match credential {
            StoredCredential::ApiKey { key } => Ok(non_blank(key)),
            StoredCredential::Token { token, expires } => {
                Ok(non_blank(token) && expires.map_or(true, |exp| exp > self.loaded_at_ms))
            }
            // Expired access tokens are refreshed by the client layer.
            StoredCredential::OAuth {
                access, refresh, ..
            } => Ok(non_blank(access) || non_blank(refresh)),
            StoredCredential::Keychain { service, account } => {
                if !self.options.allow_keychain_prompt {
                    tracing::debug!(
                        profile = %profile.id,
                        "skipping keychain-backed profile; prompting not allowed"
                    );
                    return Ok(false);
                }
                self.keychain.has_secret(&profile.id, service, account)
            }
        }
    }
}

impl AuthProfileStore for FileProfileStore {
    fn lookup(&self, provider: &str) -> ProfileLookup {
        let (profiles, order) = match &self.state {
            StoreState::Poisoned(err) => return ProfileLookup::Errored(err.clone()),
            StoreState::Loaded { profiles, order } => (profiles, order),
        };

        let preferred = order
            .get(provider)
            .into_iter()
            .flatten()
            .filter_map(|id| profiles.get(id));
        let rest = profiles
            .values()
            .filter(|p| !order.get(provider).is_some_and(|ids| ids.contains(&p.id)));

        let mut failure = None;
        for profile in preferred.chain(rest).filter(|p| p.provider == provider) {
            match &profile.body {
                ProfileBody::Malformed(message) => {
                    failure.get_or_insert_with(|| StoreError::MalformedProfile {
                        id: profile.id.clone(),
                        message: message.clone(),
                    });
                }
                ProfileBody::Parsed(credential) => match self.is_usable(profile, credential) {
                    Ok(true) => {
                        return ProfileLookup::Found(ProfileCredential {
                            id: profile.id.clone(),
                            provider: profile.provider.clone(),
                            kind: credential.kind(),
                        })
                    }
                    Ok(false) => {}
                    Err(err) => {
                        failure.get_or_insert(err);
                    }
                },
            }
        }

        match failure {
            Some(err) => ProfileLookup::Errored(err),
            None => ProfileLookup::NotFound,
        }
    }
}

impl StoredCredential {
    fn kind(&self) -> CredentialKind {
        match self {
            StoredCredential::ApiKey { .. } => CredentialKind::ApiKey,
            StoredCredential::Token { .. } => CredentialKind::Token,
            StoredCredential::OAuth { .. } => CredentialKind::OAuth,
            StoredCredential::Keychain { .. } => CredentialKind::Keychain,
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// `Ok(None)` when the file does not exist (or its directory does not).
fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

fn read_state(agent_dir: &Path) -> StoreState {
    let primary = agent_dir.join(AUTH_PROFILES_FILE);
    let result = match read_optional(&primary) {
        Ok(Some(content)) => parse_profiles(&primary, &content),
        Ok(None) => {
            let legacy = agent_dir.join(LEGACY_AUTH_FILE);
            match read_optional(&legacy) {
                Ok(Some(content)) => parse_legacy(&legacy, &content),
                Ok(None) => Ok(StoreState::Loaded {
                    profiles: BTreeMap::new(),
                    order: BTreeMap::new(),
                }),
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    };
    result.unwrap_or_else(StoreState::Poisoned)
}

fn parse_error(path: &Path, e: serde_json::Error) -> StoreError {
    StoreError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn parse_profiles(path: &Path, content: &str) -> Result<StoreState, StoreError> {
    let file: AuthProfilesFile = serde_json::from_str(content).map_err(|e| parse_error(path, e))?;

    let mut profiles = BTreeMap::new();
    for (id, raw) in file.profiles {
        let Some(provider) = raw.get("provider").and_then(Value::as_str).map(str::to_string) else {
            tracing::warn!(profile = %id, "ignoring auth profile without a provider");
            continue;
        };
        let body = match serde_json::from_value::<StoredCredential>(raw) {
            Ok(credential) => ProfileBody::Parsed(credential),
            Err(e) => ProfileBody::Malformed(e.to_string()),
        };
        profiles.insert(id.clone(), StoredProfile { id, provider, body });
    }

    Ok(StoreState::Loaded {
        profiles,
        order: file.order,
    })
}

fn parse_legacy(path: &Path, content: &str) -> Result<StoreState, StoreError> {
    let entries: BTreeMap<String, Value> =
        serde_json::from_str(content).map_err(|e| parse_error(path, e))?;

    let mut profiles = BTreeMap::new();
    for (provider, raw) in entries {
        let id = format!("{}:default", provider);
        let body = match serde_json::from_value::<LegacyCredential>(raw) {
            Ok(legacy) => ProfileBody::Parsed(legacy.into()),
            Err(e) => ProfileBody::Malformed(e.to_string()),
        };
        profiles.insert(id.clone(), StoredProfile { id, provider, body });
    }

    Ok(StoreState::Loaded {
        profiles,
        order: BTreeMap::new(),
    })
}
