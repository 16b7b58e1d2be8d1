//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches to the chat UI or
//! one of the maintenance subcommands.

pub mod auth;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::core::config::{Config, ConfigOrchestrator};
use crate::core::credentials::{resolve_credentials, CredentialPool, CredentialSource};
use crate::core::gateway::{GeminiBackend, ModelGateway};
use crate::core::keyring::KeyStore;
use crate::ui::chat_loop::run_chat;
use crate::ui::state::ChatApp;
use crate::ui::theme::Theme;
use crate::utils::logging::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    " ",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[derive(Parser)]
#[command(name = "flashchat")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A full-screen terminal chat client for Gemini Flash")]
#[command(
    long_about = "flashchat is a full-screen terminal chat client for the Gemini generateContent \
API. Every prompt rotates through a pool of API keys and retries on failure, so a single \
exhausted or revoked key does not interrupt the conversation.\n\n\
API keys (first source with keys wins):\n\
  FLASHCHAT_API_KEYS  Comma-separated list of keys\n\
  GEMINI_API_KEY      A single key\n\
  System keyring      Stored with 'flashchat auth'\n\
  Config key table    credential_table + credential_groups in config.toml\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Ctrl+N            Start a new chat\n\
  Tab / Shift+Tab   Select an assistant reply\n\
  Ctrl+Y            Copy the selected (or latest) reply\n\
  Up/Down/PgUp/PgDn Scroll the conversation\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use instead of the configured one
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Only read API keys from environment variables
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one prompt and print the reply
    Say {
        /// Prompt text; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
        /// Print the reply as raw markdown
        #[arg(long)]
        raw: bool,
    },
    /// Store API keys in the system keyring (one per line on stdin)
    Auth,
    /// Remove API keys from the system keyring
    Deauth,
    /// Show where API keys come from, masked
    Keys,
    /// Set a configuration value, or print the configuration without arguments
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let orchestrator = ConfigOrchestrator::for_user()?;
    let keystore = KeyStore::new();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = effective_config(&orchestrator, args.model)?;
            let gateway = build_gateway(&config, &keystore, args.env_only)?;
            let app = ChatApp::new(config.model(), Theme::detect(), config.markdown_enabled());
            run_chat(gateway, app).await
        }
        Commands::Say { prompt, raw } => {
            let config = effective_config(&orchestrator, args.model)?;
            let gateway = build_gateway(&config, &keystore, args.env_only)?;
            say::run_say(&gateway, &prompt.join(" "), raw || !config.markdown_enabled()).await
        }
        Commands::Auth => auth::run_auth(&keystore),
        Commands::Deauth => auth::run_deauth(&keystore),
        Commands::Keys => {
            let config = orchestrator.load()?;
            auth::print_keys(&resolve_credentials(&config, &keystore, args.env_only));
            Ok(())
        }
        Commands::Set { key, value } => settings::handle_set(&orchestrator, key, value),
        Commands::Unset { key } => settings::handle_unset(&orchestrator, &key),
    }
}

/// Stored configuration with command-line overrides applied.
fn effective_config(
    orchestrator: &ConfigOrchestrator,
    model: Option<String>,
) -> Result<Config, Box<dyn Error>> {
    let mut config = orchestrator.load()?;
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        config.model = Some(model);
    }
    Ok(config)
}

pub fn build_gateway(
    config: &Config,
    keystore: &KeyStore,
    env_only: bool,
) -> Result<ModelGateway, Box<dyn Error>> {
    let resolved = resolve_credentials(config, keystore, env_only);
    if resolved.source == CredentialSource::None {
        warn!("no API keys configured; every request will fail");
        eprintln!("⚠️  No API keys found. Set GEMINI_API_KEY or run 'flashchat auth'.");
    }
    let backend = GeminiBackend::from_config(config)?;
    let pool = CredentialPool::new(resolved.keys);
    Ok(ModelGateway::new(Arc::new(backend), Arc::new(pool)))
}

#[cfg(test)]
mod tests;
