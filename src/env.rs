//! Read-only environment snapshots.
//!
//! The live process environment is global mutable state. Everything below the
//! outermost boundary works on an [`Environment`] snapshot so resolution stays a
//! pure function of its inputs.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use once_cell::sync::Lazy;

const MAX_LOGGED_VALUE_CHARS: usize = 160;

static LOGGED_ENV: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Immutable snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the live process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `key` when it is set and not blank.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse the usual boolean spellings (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_boolean_value(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn is_truthy_env_value(value: Option<&str>) -> bool {
    value.and_then(parse_boolean_value) == Some(true)
}

/// An environment variable the runtime picked up, for one-time startup logging.
#[derive(Debug, Clone)]
pub struct AcceptedEnvOption<'a> {
    pub key: &'a str,
    pub description: &'a str,
    pub value: Option<&'a str>,
    pub redact: bool,
}

fn format_env_value(value: &str, redact: bool) -> String {
    if redact {
        return "<redacted>".to_string();
    }
    let single_line = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX_LOGGED_VALUE_CHARS {
        return single_line;
    }
    let truncated: String = single_line.chars().take(MAX_LOGGED_VALUE_CHARS).collect();
    format!("{}…", truncated)
}

/// Log an accepted variable at most once per key per process.
///
/// Returns `true` when a line was emitted. Blank values are never logged.
pub fn log_accepted_env_option(option: AcceptedEnvOption<'_>) -> bool {
    let Some(raw) = option.value.filter(|v| !v.trim().is_empty()) else {
        return false;
    };
    {
        let mut logged = LOGGED_ENV.lock().unwrap_or_else(|e| e.into_inner());
        if !logged.insert(option.key.to_string()) {
            return false;
        }
    }
    tracing::info!(
        key = option.key,
        "env: {}={} ({})",
        option.key,
        format_env_value(raw, option.redact),
        option.description
    );
    true
}
