//! `set` / `unset` subcommands.

use std::error::Error;

use crate::core::config::defaults::SETTABLE_KEYS;
use crate::core::config::ConfigOrchestrator;

/// `flashchat set [key [value…]]`. Without a key, or without a value, the
/// current configuration is printed instead.
pub fn handle_set(
    orchestrator: &ConfigOrchestrator,
    key: Option<String>,
    value: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let value = value.join(" ");
    let Some(key) = key.filter(|_| !value.trim().is_empty()) else {
        orchestrator.load()?.print_all();
        println!();
        println!("Settable keys: {}", SETTABLE_KEYS.join(", "));
        return Ok(());
    };

    orchestrator.mutate(|config| {
        config.set_value(&key, &value)?;
        Ok(())
    })?;
    println!("✅ Set {key} to: {}", value.trim());
    Ok(())
}

pub fn handle_unset(orchestrator: &ConfigOrchestrator, key: &str) -> Result<(), Box<dyn Error>> {
    orchestrator.mutate(|config| {
        config.unset_value(key)?;
        Ok(())
    })?;
    println!("✅ Unset {key}");
    Ok(())
}
