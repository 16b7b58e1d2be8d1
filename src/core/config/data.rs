use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Gemini model id (e.g., "gemini-1.5-flash")
    pub model: Option<String>,
    /// API root without version segment
    pub base_url: Option<String>,
    /// API version path segment (e.g., "v1beta")
    pub api_version: Option<String>,
    /// Per-request timeout in seconds; no timeout when unset
    pub request_timeout_secs: Option<u64>,
    /// Enable markdown rendering of assistant replies
    pub markdown: Option<bool>,
    /// Groups to reassemble from `credential_table`, in pool order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credential_groups: Vec<String>,
    /// Label → value entries; `color-<group>-<n>` labels form keys
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub credential_table: HashMap<String, String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
