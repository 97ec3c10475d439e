//! Runtime knobs, read once at the outermost boundary.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `AI_AGENT_DIR` | Agent directory holding the auth-profile store | `~/.ai-agent/agent` |
//! | `AI_ALLOW_KEYCHAIN_PROMPT` | Allow interactive keychain prompts | `false` |

use std::path::PathBuf;

use crate::env::{parse_boolean_value, Environment};
use crate::error::{Error, ErrorContext};
use crate::Result;

pub const AGENT_DIR_ENV: &str = "AI_AGENT_DIR";
pub const ALLOW_KEYCHAIN_PROMPT_ENV: &str = "AI_ALLOW_KEYCHAIN_PROMPT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub agent_dir: PathBuf,
    pub allow_keychain_prompt: bool,
}

impl ResolverConfig {
    pub fn from_env(env: &Environment) -> Result<Self> {
        let agent_dir = env
            .get_non_empty(AGENT_DIR_ENV)
            .map(|v| PathBuf::from(v.trim()))
            .or_else(default_agent_dir)
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "cannot determine the agent directory",
                    ErrorContext::new()
                        .with_field_path(AGENT_DIR_ENV)
                        .with_details("no home directory; set the variable explicitly"),
                )
            })?;

        // Unparseable values fall back to the default, like the other env knobs.
        let allow_keychain_prompt = match env.get_non_empty(ALLOW_KEYCHAIN_PROMPT_ENV) {
            None => false,
            Some(raw) => parse_boolean_value(raw).unwrap_or_else(|| {
                tracing::warn!(
                    key = ALLOW_KEYCHAIN_PROMPT_ENV,
                    value = raw,
                    "ignoring unrecognized boolean"
                );
                false
            }),
        };

        Ok(Self {
            agent_dir,
            allow_keychain_prompt,
        })
    }
}

pub fn default_agent_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ai-agent").join("agent"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values() {
        let env = Environment::from_pairs([
            (AGENT_DIR_ENV, " /srv/agent "),
            (ALLOW_KEYCHAIN_PROMPT_ENV, "yes"),
        ]);
        let config = ResolverConfig::from_env(&env).unwrap();
        assert_eq!(config.agent_dir, PathBuf::from("/srv/agent"));
        assert!(config.allow_keychain_prompt);
    }

    #[test]
    fn unrecognized_boolean_is_false() {
        let env = Environment::from_pairs([
            (AGENT_DIR_ENV, "/srv/agent"),
            (ALLOW_KEYCHAIN_PROMPT_ENV, "sometimes"),
        ]);
        assert!(!ResolverConfig::from_env(&env).unwrap().allow_keychain_prompt);
    }

    #[test]
    fn defaults_under_home() {
        let Some(expected) = default_agent_dir() else {
            return;
        };
        let config = ResolverConfig::from_env(&Environment::new()).unwrap();
        assert_eq!(config.agent_dir, expected);
        assert!(!config.allow_keychain_prompt);
    }
}
