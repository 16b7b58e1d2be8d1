//! URL utilities for consistent endpoint construction

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use flashchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/"), "https://api.example.com");
/// assert_eq!(normalize_base_url("https://api.example.com///"), "https://api.example.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join path segments onto a base URL without doubling or dropping slashes
pub fn construct_api_url(base_url: &str, segments: &[&str]) -> String {
    let mut url = normalize_base_url(base_url);
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }
    url
}

/// Endpoint for `models/<model>:generateContent`
///
/// ```
/// use flashchat::utils::url::generate_content_url;
///
/// assert_eq!(
///     generate_content_url("https://generativelanguage.googleapis.com/", "v1beta", "gemini-1.5-flash"),
///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
/// );
/// ```
pub fn generate_content_url(base_url: &str, api_version: &str, model: &str) -> String {
    let model = model.trim().trim_start_matches("models/");
    let action = format!("{model}:generateContent");
    construct_api_url(base_url, &[api_version, "models", &action])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_skips_empty_segments() {
        assert_eq!(
            construct_api_url("http://localhost:1234/", &["", "/v1/", "models"]),
            "http://localhost:1234/v1/models"
        );
    }

    #[test]
    fn model_prefix_is_not_duplicated() {
        assert_eq!(
            generate_content_url("http://h", "v1", "models/gemini-pro"),
            "http://h/v1/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn empty_api_version_is_omitted() {
        assert_eq!(
            generate_content_url("http://h", "", "m"),
            "http://h/models/m:generateContent"
        );
    }
}
