//! `auth`, `deauth` and `keys` subcommands.

use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::core::credentials::{mask_key, ResolvedCredentials};
use crate::core::keyring::KeyStore;

/// Collect keys one per line until EOF or an empty line. Leading and
/// trailing whitespace is dropped, as are duplicates.
pub fn read_keys<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut keys: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let key = line.trim();
        if key.is_empty() {
            break;
        }
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    Ok(keys)
}

pub fn run_auth(keystore: &KeyStore) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        println!("Paste your Gemini API keys, one per line. Finish with an empty line:");
        io::stdout().flush()?;
    }
    let keys = read_keys(stdin.lock())?;
    if keys.is_empty() {
        return Err("no API keys were entered".into());
    }

    keystore.store_keys(&keys)?;
    println!("✅ Stored {} API key(s) in the system keyring", keys.len());
    Ok(())
}

pub fn run_deauth(keystore: &KeyStore) -> Result<(), Box<dyn Error>> {
    if keystore.delete_keys()? {
        println!("✅ Removed API keys from the system keyring");
    } else {
        println!("No API keys were stored in the system keyring");
    }
    Ok(())
}

pub fn format_keys(resolved: &ResolvedCredentials) -> Vec<String> {
    let mut out = vec![format!("Key source: {}", resolved.source)];
    for (index, key) in resolved.keys.iter().enumerate() {
        out.push(format!("  {}. {}", index + 1, mask_key(key)));
    }
    out
}

pub fn print_keys(resolved: &ResolvedCredentials) {
    for line in format_keys(resolved) {
        println!("{line}");
    }
}
