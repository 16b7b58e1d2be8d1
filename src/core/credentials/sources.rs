use std::fmt;

use tracing::{info, warn};

use super::table::resolve_groups;
use crate::core::config::Config;
use crate::core::keyring::KeyStore;

pub const ENV_API_KEYS: &str = "FLASHCHAT_API_KEYS";
pub const ENV_SINGLE_KEY: &str = "GEMINI_API_KEY";

/// Where the active key list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keyring,
    ConfigTable,
    None,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CredentialSource::Environment => "environment",
            CredentialSource::Keyring => "system keyring",
            CredentialSource::ConfigTable => "config credential table",
            CredentialSource::None => "none",
        };
        f.write_str(label)
    }
}

/// Resolved key list plus its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub source: CredentialSource,
    pub keys: Vec<String>,
}

/// Split a comma separated key list, dropping blanks.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keys from `FLASHCHAT_API_KEYS`, falling back to `GEMINI_API_KEY`.
pub fn keys_from_env_vars<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_API_KEYS) {
        let keys = parse_key_list(&raw);
        if !keys.is_empty() {
            return keys;
        }
    }
    lookup(ENV_SINGLE_KEY)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .into_iter()
        .collect()
}

/// Walk environment, keyring, then the config key table; first non-empty wins.
///
/// The key table path keeps empty group results in place: an unmatched group
/// becomes an empty credential that fails at the API and triggers rotation.
pub fn resolve_credentials(
    config: &Config,
    keystore: &KeyStore,
    env_only: bool,
) -> ResolvedCredentials {
    let env_keys = keys_from_env_vars(|name| std::env::var(name).ok());
    if !env_keys.is_empty() || env_only {
        return finish(CredentialSource::Environment, env_keys);
    }

    match keystore.load_keys() {
        Ok(keys) if !keys.is_empty() => return finish(CredentialSource::Keyring, keys),
        Ok(_) => {}
        Err(err) => warn!(error = %err, recoverable = err.is_recoverable(), "keyring lookup failed"),
    }

    if !config.credential_table.is_empty() {
        let keys = resolve_groups(&config.credential_table, &config.credential_groups());
        return finish(CredentialSource::ConfigTable, keys);
    }

    finish(CredentialSource::None, Vec::new())
}

fn finish(source: CredentialSource, keys: Vec<String>) -> ResolvedCredentials {
    let source = if keys.is_empty() && source != CredentialSource::ConfigTable {
        CredentialSource::None
    } else {
        source
    };
    info!(%source, count = keys.len(), "resolved api credentials");
    ResolvedCredentials { source, keys }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn key_list_parsing_trims_and_skips_blanks() {
        assert_eq!(parse_key_list(" a, ,b ,"), vec!["a", "b"]);
        assert!(parse_key_list("").is_empty());
    }

    #[test]
    fn multi_key_variable_wins_over_single_key() {
        let keys = keys_from_env_vars(lookup(&[(ENV_API_KEYS, "a,b"), (ENV_SINGLE_KEY, "c")]));
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn single_key_variable_is_a_fallback() {
        let keys = keys_from_env_vars(lookup(&[(ENV_API_KEYS, " , "), (ENV_SINGLE_KEY, " c ")]));
        assert_eq!(keys, vec!["c"]);
        assert!(keys_from_env_vars(lookup(&[])).is_empty());
    }

    #[test]
    fn table_source_keeps_empty_group_credentials() {
        let resolved = finish(
            CredentialSource::ConfigTable,
            vec!["abc".to_string(), String::new()],
        );
        assert_eq!(resolved.source, CredentialSource::ConfigTable);
        assert_eq!(resolved.keys.len(), 2);
    }

    #[test]
    fn empty_non_table_sources_report_none() {
        let resolved = finish(CredentialSource::Keyring, Vec::new());
        assert_eq!(resolved.source, CredentialSource::None);
    }
}
