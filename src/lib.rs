//! # ai-provider-resolver
//!
//! 智能体运行时的隐式提供商解析。
//!
//! Implicit provider resolution for agent runtimes: decides at startup which LLM
//! backends are usable given the environment, and builds a normalized
//! configuration for each one without any hand-authored config file.
//!
//! ## Overview
//!
//! Every provider in the built-in [`registry`] is probed for a credential, first
//! in environment variables and then in the agent's authentication-profile
//! [`store`]. Providers with a credential end up in the [`ResolutionResult`];
//! the rest are silently omitted.
//!
//! Resolved configs never hold secrets. `apiKey` is a *reference* to where the
//! secret lives (an environment variable name or a profile id), so results are
//! safe to log and serialize. Dereferencing happens in the client layer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_provider_resolver::{resolve_implicit_providers, ResolveOptions};
//!
//! fn main() -> ai_provider_resolver::Result<()> {
//!     // Reads the live process environment; inject one with `with_environment`.
//!     let options = ResolveOptions::new("/home/me/.ai-agent/agent");
//!     let providers = resolve_implicit_providers(&options)?;
//!     for config in providers.iter() {
//!         println!("{} -> {} ({})", config.name, config.base_url, config.api);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Known provider definitions and protocol tags |
//! | [`env`] | Read-only environment snapshots |
//! | [`store`] | Authentication-profile store access |
//! | [`credentials`] | Ordered credential probes |
//! | [`resolver`] | Resolution entry points and result assembly |
//! | [`config`] | Environment-driven runtime knobs |

pub mod config;
pub mod credentials;
pub mod env;
pub mod registry;
pub mod resolver;
pub mod store;

pub use config::ResolverConfig;
pub use credentials::{CredentialOutcome, CredentialReference};
pub use env::Environment;
pub use registry::{list_provider_definitions, ApiProtocol, ProviderDefinition};
pub use resolver::{
    explain_implicit_providers, resolve_implicit_providers, resolve_implicit_providers_concurrent,
    resolve_implicit_providers_with, ProviderOutcome, ResolutionContext, ResolutionResult,
    ResolveOptions, ResolvedProviderConfig,
};
pub use store::{ensure_store, AuthProfileStore, ProfileLookup, StoreOptions};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
