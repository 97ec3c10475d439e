use std::path::{Path, PathBuf};

use crate::config::ResolverConfig;
use crate::env::Environment;
use crate::error::{Error, ErrorContext};
use crate::store::StoreOptions;
use crate::Result;

/// Caller-facing inputs for one resolution call.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    agent_dir: PathBuf,
    environment: Option<Environment>,
    allow_keychain_prompt: Option<bool>,
}

impl ResolveOptions {
    pub fn new(agent_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent_dir: agent_dir.into(),
            environment: None,
            allow_keychain_prompt: None,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.agent_dir.clone()).allow_keychain_prompt(config.allow_keychain_prompt)
    }

    /// Use an injected environment instead of the live process environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Allow store lookups that may block on an interactive keychain prompt.
    ///
    /// Defaults to `false`; keep it off in non-interactive and test contexts.
    pub fn allow_keychain_prompt(mut self, allow: bool) -> Self {
        self.allow_keychain_prompt = Some(allow);
        self
    }

    pub fn agent_dir(&self) -> &Path {
        &self.agent_dir
    }
}

/// Validated, immutable inputs shared by every provider probe in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    agent_dir: PathBuf,
    allow_keychain_prompt: bool,
    environment: Environment,
}

impl ResolutionContext {
    /// Validate options and snapshot the environment.
    ///
    /// The agent directory must be absolute; anything else is a caller error.
    /// The directory itself does not need to exist.
    pub fn new(options: &ResolveOptions) -> Result<Self> {
        validate_agent_dir(&options.agent_dir)?;
        Ok(Self {
            agent_dir: options.agent_dir.clone(),
            allow_keychain_prompt: options.allow_keychain_prompt.unwrap_or(false),
            environment: options
                .environment
                .clone()
                .unwrap_or_else(Environment::from_process),
        })
    }

    pub fn agent_dir(&self) -> &Path {
        &self.agent_dir
    }

    pub fn allow_keychain_prompt(&self) -> bool {
        self.allow_keychain_prompt
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            allow_keychain_prompt: self.allow_keychain_prompt,
        }
    }
}

fn validate_agent_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::validation_with_context(
            "agent directory must not be empty",
            ErrorContext::new()
                .with_field_path("agent_dir")
                .with_source("resolver"),
        ));
    }
    if !path.is_absolute() {
        return Err(Error::validation_with_context(
            "agent directory must be an absolute path",
            ErrorContext::new()
                .with_field_path("agent_dir")
                .with_details(path.display().to_string())
                .with_source("resolver"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_and_empty_dirs() {
        let err = ResolutionContext::new(&ResolveOptions::new("agent")).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("details: agent"));

        let err = ResolutionContext::new(&ResolveOptions::new("")).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn nonexistent_absolute_dir_is_fine() {
        let dir = std::env::temp_dir().join("ai-provider-resolver-ctx-missing");
        let ctx = ResolutionContext::new(&ResolveOptions::new(&dir)).unwrap();
        assert_eq!(ctx.agent_dir(), dir.as_path());
        assert!(!ctx.allow_keychain_prompt());
    }

    #[test]
    fn injected_environment_is_used_verbatim() {
        let env = Environment::from_pairs([("ONLY", "this")]);
        let ctx = ResolutionContext::new(
            &ResolveOptions::new(std::env::temp_dir())
                .with_environment(env.clone())
                .allow_keychain_prompt(true),
        )
        .unwrap();
        assert_eq!(ctx.environment(), &env);
        assert!(ctx.store_options().allow_keychain_prompt);
    }
}
