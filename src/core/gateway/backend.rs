use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::BackendError;
use crate::api::{summarize_api_error, GenerateContentRequest, GenerateContentResponse};
use crate::core::config::Config;
use crate::utils::url::generate_content_url;

pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// One completion call with one credential. Implementations must not retry;
/// retry and key rotation belong to the gateway.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, BackendError>;
}

/// `generateContent` over HTTPS.
#[derive(Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, base_url: &str, api_version: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: generate_content_url(base_url, api_version, model),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_client(config.request_timeout())?;
        Ok(Self::new(
            client,
            config.base_url(),
            config.api_version(),
            config.model(),
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "generateContent returned");

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                summary: summarize_api_error(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        match parsed.text() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(BackendError::EmptyResponse {
                reason: parsed.block_reason().map(str::to_string).or_else(|| {
                    parsed
                        .candidates
                        .first()
                        .and_then(|candidate| candidate.finish_reason.clone())
                }),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    const PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn backend(server: &ServerGuard) -> GeminiBackend {
        GeminiBackend::new(
            reqwest::Client::new(),
            &server.url(),
            "v1beta",
            "gemini-1.5-flash",
        )
    }

    #[tokio::test]
    async fn successful_call_returns_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header(API_KEY_HEADER, "key-a")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [{"text": "hello"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"**Hi**"}]}}]}"#)
            .create_async()
            .await;

        let text = backend(&server).generate("key-a", "hello").await.unwrap();
        assert_eq!(text, "**Hi**");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_summarized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key."}}"#)
            .create_async()
            .await;

        let err = backend(&server).generate("", "hello").await.unwrap_err();
        match err {
            BackendError::Status { status, summary } => {
                assert_eq!(status, 400);
                assert_eq!(summary, "API key not valid. Please pass a valid API key.");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_text_is_an_empty_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":""}]},"finishReason":"MAX_TOKENS"}]}"#)
            .create_async()
            .await;

        let err = backend(&server).generate("k", "hello").await.unwrap_err();
        match err {
            BackendError::EmptyResponse { reason } => {
                assert_eq!(reason.as_deref(), Some("MAX_TOKENS"));
            }
            other => panic!("expected empty response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn whitespace_text_is_a_reply() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":" \n"}]}}]}"#)
            .create_async()
            .await;

        assert_eq!(backend(&server).generate("k", "hello").await.unwrap(), " \n");
    }

    #[tokio::test]
    async fn blocked_prompt_reports_block_reason() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let err = backend(&server).generate("k", "hello").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Empty response received from the API (SAFETY)"
        );
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("<html>proxy</html>")
            .create_async()
            .await;

        let err = backend(&server).generate("k", "hello").await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn endpoint_is_built_from_config() {
        let config = Config {
            base_url: Some("http://localhost:9/".to_string()),
            model: Some("gemini-test".to_string()),
            ..Default::default()
        };
        let backend = GeminiBackend::from_config(&config).unwrap();
        assert_eq!(
            backend.endpoint(),
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
    }
}
