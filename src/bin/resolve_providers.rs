//! resolve-providers: print the providers usable from the current environment
//!
//! Usage:
//!   resolve-providers [--agent-dir <path>]            JSON mapping of resolved providers
//!   resolve-providers --format table                  Every known provider, with omission reasons
//!   resolve-providers --check                         Validate the built-in registry and exit

use std::path::PathBuf;

use ai_provider_resolver::registry::validate_definitions;
use ai_provider_resolver::resolver::OmissionReason;
use ai_provider_resolver::{
    explain_implicit_providers, list_provider_definitions, resolve_implicit_providers,
    resolve_implicit_providers_concurrent, Environment, ProviderOutcome, ResolveOptions,
    ResolverConfig,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Parser)]
#[command(
    name = "resolve-providers",
    version,
    about = "Resolve implicit LLM provider configurations"
)]
struct Cli {
    /// Agent directory holding the auth-profile store [env: AI_AGENT_DIR]
    #[arg(long, value_name = "PATH")]
    agent_dir: Option<PathBuf>,

    /// Allow interactive keychain prompts [env: AI_ALLOW_KEYCHAIN_PROMPT]
    #[arg(long)]
    allow_keychain_prompt: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Validate the built-in provider registry and exit
    #[arg(long)]
    check: bool,

    /// Probe providers in parallel
    #[arg(long)]
    concurrent: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.check {
        validate_definitions(list_provider_definitions())?;
        println!(
            "registry ok: {} providers",
            list_provider_definitions().len()
        );
        return Ok(());
    }

    let env = Environment::from_process();
    let mut config = ResolverConfig::from_env(&env)?;
    if let Some(dir) = cli.agent_dir {
        config.agent_dir = dir;
    }
    if cli.allow_keychain_prompt {
        config.allow_keychain_prompt = true;
    }
    if config.agent_dir.is_relative() {
        let cwd = std::env::current_dir().context("cannot resolve relative agent directory")?;
        config.agent_dir = cwd.join(&config.agent_dir);
    }

    let options = ResolveOptions::from_config(&config).with_environment(env);

    match cli.format {
        OutputFormat::Json => {
            let providers = if cli.concurrent {
                resolve_implicit_providers_concurrent(&options).await?
            } else {
                resolve_implicit_providers(&options)?
            };
            println!("{}", providers.to_json_pretty()?);
        }
        OutputFormat::Table => {
            let outcomes = explain_implicit_providers(&options)?;
            print_table(&outcomes);
        }
    }
    Ok(())
}

fn print_table(outcomes: &[ProviderOutcome]) {
    println!("{:<14} {:<10} {:<22} DETAIL", "PROVIDER", "STATUS", "API");
    for outcome in outcomes {
        match outcome {
            ProviderOutcome::Resolved(config) => println!(
                "{:<14} {:<10} {:<22} {} via {} ({})",
                config.name,
                "resolved",
                config.api.as_str(),
                config.base_url,
                config.api_key,
                config.credential.source()
            ),
            ProviderOutcome::Omitted { name, reason } => {
                let detail = match reason {
                    OmissionReason::NoCredential => "no credential".to_string(),
                    OmissionReason::SourceFailed { source, reason } => {
                        format!("{} source failed: {}", source, reason)
                    }
                };
                println!("{:<14} {:<10} {:<22} {}", name, "omitted", "-", detail);
            }
        }
    }
}
