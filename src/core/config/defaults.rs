use std::time::Duration;

use crate::core::config::data::Config;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1beta";
pub const DEFAULT_CREDENTIAL_GROUPS: [&str; 2] = ["1", "2"];

/// Keys accepted by `flashchat set` / `flashchat unset`.
pub const SETTABLE_KEYS: [&str; 5] = [
    "model",
    "base-url",
    "api-version",
    "request-timeout",
    "markdown",
];

impl Config {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn credential_groups(&self) -> Vec<String> {
        if self.credential_groups.is_empty() {
            DEFAULT_CREDENTIAL_GROUPS
                .iter()
                .map(|g| g.to_string())
                .collect()
        } else {
            self.credential_groups.clone()
        }
    }

    /// Apply `flashchat set <key> <value>`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for '{key}'"));
        }
        match key {
            "model" => self.model = Some(value.to_string()),
            "base-url" => self.base_url = Some(value.to_string()),
            "api-version" => self.api_version = Some(value.to_string()),
            "request-timeout" => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| format!("request-timeout expects whole seconds, got '{value}'"))?;
                self.request_timeout_secs = Some(secs);
            }
            "markdown" => self.markdown = Some(parse_toggle(value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Apply `flashchat unset <key>`.
    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "model" => self.model = None,
            "base-url" => self.base_url = None,
            "api-version" => self.api_version = None,
            "request-timeout" => self.request_timeout_secs = None,
            "markdown" => self.markdown = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_toggle(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("Expected on/off, got '{value}'")),
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key} (expected one of: {})",
        SETTABLE_KEYS.join(", ")
    )
}
