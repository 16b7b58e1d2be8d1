//! Diagnostic logging to a file.
//!
//! The chat UI owns the terminal, so log output never goes to stdout or
//! stderr. Without `--log <file>` no subscriber is installed at all.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "FLASHCHAT_LOG";
pub const DEFAULT_LOG_FILTER: &str = "flashchat=info";

/// Directive to use when the environment supplies `raw` (or nothing).
fn filter_directive(raw: Option<String>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_LOG_FILTER.to_string(),
    }
}

fn build_filter(raw: Option<String>) -> EnvFilter {
    EnvFilter::try_new(filter_directive(raw))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber, appending to `log_file`.
///
/// Returns `Ok(false)` when no file was requested. Fails if the file cannot
/// be opened or a subscriber is already installed.
pub fn init_tracing(log_file: Option<&Path>) -> Result<bool, Box<dyn Error>> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(build_filter(std::env::var(LOG_FILTER_ENV).ok()))
        .with(fmt_layer)
        .try_init()?;

    Ok(true)
}
