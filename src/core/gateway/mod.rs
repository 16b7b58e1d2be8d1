//! Single-shot completion with per-call key rotation.

pub mod backend;
pub mod error;
pub mod prompt;

use std::sync::Arc;

use tracing::{debug, warn};

pub use backend::{CompletionBackend, GeminiBackend};
pub use error::{BackendError, GatewayError};
pub use prompt::{build_prompt, MARKDOWN_INSTRUCTION};

use crate::core::credentials::CredentialPool;
use crate::core::message::Message;

/// Dispatches prompts to a [`CompletionBackend`], rotating through a shared
/// [`CredentialPool`]. Cheap to clone; clones share the pool cursor.
#[derive(Clone)]
pub struct ModelGateway {
    backend: Arc<dyn CompletionBackend>,
    pool: Arc<CredentialPool>,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn CompletionBackend>, pool: Arc<CredentialPool>) -> Self {
        Self { backend, pool }
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    /// Ask the model to answer `prompt` given the prior `history`.
    ///
    /// Makes at most one attempt per credential. Every attempt, the first
    /// included, advances the pool cursor, so a run where all attempts fail
    /// leaves the cursor where it started.
    pub async fn respond(&self, prompt: &str, history: &[Message]) -> Result<String, GatewayError> {
        if prompt.trim().is_empty() {
            return Err(GatewayError::EmptyPrompt);
        }

        let full_prompt = build_prompt(prompt, history);
        let max_attempts = self.pool.len();
        let mut last_error: Option<BackendError> = None;

        for attempt in 1..=max_attempts {
            let Some((key_index, api_key)) = self.pool.next() else {
                break;
            };

            match self.backend.generate(api_key, &full_prompt).await {
                Ok(text) if !text.is_empty() => {
                    debug!(attempt, key_index, chars = text.len(), "model responded");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(attempt, max_attempts, key_index, "empty model response; rotating key");
                    last_error = Some(BackendError::EmptyResponse { reason: None });
                }
                Err(err) => {
                    warn!(attempt, max_attempts, key_index, error = %err, "model call failed; rotating key");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(last) => Err(GatewayError::Exhausted {
                attempts: max_attempts,
                last,
            }),
            None => Err(GatewayError::KeysExhausted),
        }
    }
}
