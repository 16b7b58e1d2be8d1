//! Conversation state for one run of the client.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::gateway::{GatewayError, ModelGateway};
use crate::core::message::Message;

/// A submitted prompt waiting for the gateway.
///
/// Carries the history as it was *before* the prompt was appended, and the
/// token that [`ChatSession::new_chat`] cancels to orphan the request.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: u64,
    pub prompt: String,
    pub history: Vec<Message>,
    pub cancel_token: CancellationToken,
}

impl PendingRequest {
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Run the request against `gateway`, giving up early if cancelled.
    pub async fn run(&self, gateway: &ModelGateway) -> Option<Result<String, GatewayError>> {
        tokio::select! {
            result = gateway.respond(&self.prompt, &self.history) => Some(result),
            _ = self.cancel_token.cancelled() => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    pub input: String,
    loading: bool,
    in_flight: usize,
    /// Parent of every request token issued since the last new chat.
    conversation: CancellationToken,
    next_request_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Append the user message and hand back the request to dispatch.
    /// Blank text is ignored and returns `None`.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingRequest> {
        if text.trim().is_empty() {
            return None;
        }

        let history = self.messages.clone();
        self.messages.push(Message::user(text));
        self.loading = true;
        self.in_flight += 1;
        self.next_request_id += 1;

        debug!(request_id = self.next_request_id, history = history.len(), "dispatching prompt");
        Some(PendingRequest {
            id: self.next_request_id,
            prompt: text.to_string(),
            history,
            cancel_token: self.conversation.child_token(),
        })
    }

    /// Record the outcome of `pending`. Failures become an `Error:` assistant
    /// message. Returns false, changing nothing, when the request was
    /// cancelled in the meantime.
    pub fn complete(
        &mut self,
        pending: &PendingRequest,
        result: Result<String, GatewayError>,
    ) -> bool {
        if pending.is_cancelled() {
            info!(request_id = pending.id, "discarding reply for cancelled request");
            return false;
        }

        let reply = match result {
            Ok(text) => Message::assistant(text),
            Err(err) => {
                info!(request_id = pending.id, error = %err, "request failed");
                Message::error(err)
            }
        };
        self.messages.push(reply);
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
        true
    }

    /// Submit-and-wait in one call.
    pub async fn send(&mut self, text: &str, gateway: &ModelGateway) {
        let Some(pending) = self.begin_send(text) else {
            return;
        };
        let result = gateway.respond(&pending.prompt, &pending.history).await;
        self.complete(&pending, result);
    }

    /// Take the input buffer for sending. Refused while a request is pending,
    /// mirroring the disabled send control; blank input is left untouched.
    pub fn submit_input(&mut self) -> Option<PendingRequest> {
        if self.loading {
            return None;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input.clear();
        self.begin_send(&text)
    }

    /// Clear the conversation and input. An in-flight request is cancelled
    /// so its reply cannot land in the new conversation.
    pub fn new_chat(&mut self) {
        let previous = std::mem::take(&mut self.conversation);
        previous.cancel();
        self.messages.clear();
        self.input.clear();
        self.in_flight = 0;
        self.loading = false;
    }

    /// Index of the most recent assistant message, if any.
    pub fn last_assistant_index(&self) -> Option<usize> {
        self.messages.iter().rposition(Message::is_assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::testing::{gateway, ScriptedBackend};
    use crate::core::message::Role;
    use std::sync::Arc;

    #[tokio::test]
    async fn send_appends_one_user_and_one_assistant_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("**hello**")]));
        let gw = gateway(backend, &["k"]);
        let mut session = ChatSession::new();

        session.send("hi", &gw).await;

        assert_eq!(
            session.messages(),
            &[Message::user("hi"), Message::assistant("**hello**")]
        );
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn failure_becomes_error_prefixed_assistant_message() {
        let backend = Arc::new(ScriptedBackend::failing());
        let gw = gateway(backend, &["a", "b"]);
        let mut session = ChatSession::new();

        session.send("hi", &gw).await;

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Error: connection refused");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn empty_pool_surfaces_as_error_bubble() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let gw = gateway(backend, &[]);
        let mut session = ChatSession::new();

        session.send("hi", &gw).await;
        assert_eq!(session.messages()[1].content, "Error: All API keys exhausted");
    }

    #[tokio::test]
    async fn blank_send_is_a_no_op() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("unused")]));
        let gw = gateway(backend.clone(), &["k"]);
        let mut session = ChatSession::new();

        session.send("   \n", &gw).await;

        assert!(session.messages().is_empty());
        assert!(!session.is_loading());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn gateway_receives_history_without_the_new_prompt() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("a1"), Ok("a2")]));
        let gw = gateway(backend.clone(), &["k"]);
        let mut session = ChatSession::new();

        session.send("q1", &gw).await;
        let pending = session.begin_send("q2").unwrap();

        assert_eq!(
            pending.history,
            vec![Message::user("q1"), Message::assistant("a1")]
        );
        assert_eq!(session.messages().last(), Some(&Message::user("q2")));
        assert!(session.is_loading());

        let result = gw.respond(&pending.prompt, &pending.history).await;
        assert!(session.complete(&pending, result));
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn user_message_is_visible_before_completion() {
        let mut session = ChatSession::new();
        let pending = session.begin_send("hello").unwrap();
        assert!(pending.history.is_empty());
        assert_eq!(session.messages(), &[Message::user("hello")]);
        assert!(session.is_loading());
    }

    #[test]
    fn new_chat_clears_messages_and_input() {
        let mut session = ChatSession::new();
        session.begin_send("hello").unwrap();
        session.input = "draft".to_string();

        session.new_chat();

        assert!(session.messages().is_empty());
        assert!(session.input.is_empty());
        assert!(!session.is_loading());
    }

    #[test]
    fn late_reply_after_new_chat_is_discarded() {
        let mut session = ChatSession::new();
        let pending = session.begin_send("hello").unwrap();

        session.new_chat();
        assert!(pending.is_cancelled());

        assert!(!session.complete(&pending, Ok("late".to_string())));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn reply_to_an_older_request_does_not_clear_newer_loading() {
        let mut session = ChatSession::new();
        let first = session.begin_send("one").unwrap();
        session.new_chat();
        let second = session.begin_send("two").unwrap();

        assert!(!session.complete(&first, Ok("stale".to_string())));
        assert!(session.is_loading());
        assert!(session.complete(&second, Ok("fresh".to_string())));
        assert_eq!(
            session.messages(),
            &[Message::user("two"), Message::assistant("fresh")]
        );
    }

    #[tokio::test]
    async fn new_chat_does_not_reset_credential_rotation() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("1"), Ok("2")]));
        let gw = gateway(backend.clone(), &["a", "b", "c"]);
        let mut session = ChatSession::new();

        session.send("first", &gw).await;
        session.new_chat();
        session.send("second", &gw).await;

        assert_eq!(backend.keys_used(), vec!["b", "c"]);
    }

    #[test]
    fn overlapping_sends_each_get_their_reply() {
        let mut session = ChatSession::new();
        let first = session.begin_send("one").unwrap();
        let second = session.begin_send("two").unwrap();
        assert_eq!(second.history, vec![Message::user("one")]);

        assert!(session.complete(&first, Ok("r1".to_string())));
        assert!(session.is_loading());
        assert!(session.complete(&second, Ok("r2".to_string())));
        assert!(!session.is_loading());
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn submit_input_trims_and_clears_buffer() {
        let mut session = ChatSession::new();
        session.input = "  hi there  ".to_string();

        let pending = session.submit_input().unwrap();
        assert_eq!(pending.prompt, "hi there");
        assert!(session.input.is_empty());
    }

    #[test]
    fn submit_input_is_refused_while_loading() {
        let mut session = ChatSession::new();
        session.begin_send("first").unwrap();
        session.input = "second".to_string();

        assert!(session.submit_input().is_none());
        assert_eq!(session.input, "second");
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn pending_run_stops_when_cancelled() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("never")]));
        let gw = gateway(backend, &["k"]);
        let mut session = ChatSession::new();
        let pending = session.begin_send("hi").unwrap();

        pending.cancel_token.cancel();
        // The cancelled branch is ready immediately; either branch may win
        // the select, but a cancelled request is never applied.
        if let Some(result) = pending.run(&gw).await {
            assert!(!session.complete(&pending, result));
        }
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn last_assistant_index_skips_trailing_user_message() {
        let mut session = ChatSession::new();
        let pending = session.begin_send("q").unwrap();
        session.complete(&pending, Ok("a".to_string()));
        session.begin_send("q2").unwrap();
        assert_eq!(session.last_assistant_index(), Some(1));
    }
}
