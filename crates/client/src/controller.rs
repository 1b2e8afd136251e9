//! Chat controller — owns the conversation and one in-flight stream at most.

use futures_util::future::Abortable;
use proto::{ChatRequest, Conversation, StreamError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::consumer::{StreamEvent, consume};
use crate::session::StreamSession;

/// Notice shown in place of the assistant reply when a stream fails.
pub const ERROR_NOTICE: &str =
    "Something went wrong while generating a response. Please try again.";

/// Drives the end-to-end send/receive cycle and exposes cancellation.
///
/// At most one stream is in flight: `send` is a no-op while streaming is
/// active, so the invariant holds without locking. Stream progress arrives as
/// [`StreamEvent`]s on the receiver returned by [`ChatController::new`]; the
/// owner feeds them back through [`ChatController::apply`].
pub struct ChatController {
    http: reqwest::Client,
    endpoint: String,
    conversation: Conversation,
    streaming: bool,
    session: Option<StreamSession>,
    updates_tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChatController {
    /// Creates a controller targeting the given relay endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        (
            Self {
                http: reqwest::Client::new(),
                endpoint: endpoint.into(),
                conversation: Conversation::new(),
                streaming: false,
                session: None,
                updates_tx,
            },
            updates_rx,
        )
    }

    /// Read access to the conversation history.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Mutable access for local (non-stream) history edits such as the
    /// startup greeting.
    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Returns true while a stream is in flight.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Sends a user message and starts streaming the assistant reply.
    ///
    /// No-op (returns false) when the trimmed text is empty or a stream is
    /// already active. Otherwise appends the user message and an empty
    /// assistant placeholder, then spawns the network task bound to a fresh
    /// session's cancellation handle.
    pub fn send(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.streaming {
            return false;
        }

        self.conversation.push_user(text);
        self.conversation.begin_assistant();
        self.streaming = true;

        let (session, registration) = StreamSession::new();
        let request = ChatRequest {
            messages: self.conversation.wire_messages(),
        };
        self.session = Some(session.clone());

        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let tx = self.updates_tx.clone();

        debug!(endpoint = %endpoint, messages = request.messages.len(), "Stream task spawned");

        tokio::spawn(async move {
            let call = run_stream(http, endpoint, request, session.clone(), tx.clone());
            // One cancellation handle covers the whole call: connection
            // setup and every pending read unblock on abort.
            let outcome = Abortable::new(call, registration).await;
            let terminal = match outcome {
                Ok(Ok(())) => StreamEvent::Done,
                // User-initiated stop is a normal termination path.
                Err(_aborted) => StreamEvent::Done,
                Ok(Err(_)) if session.stop_requested() => StreamEvent::Done,
                Ok(Err(e)) => StreamEvent::Failed(e.to_string()),
            };
            let _ = tx.send(terminal);
        });

        true
    }

    /// Stops the active stream: flags the session, aborts the network call,
    /// and marks streaming inactive immediately. Partial content is kept.
    pub fn stop(&mut self) {
        if !self.streaming {
            return;
        }
        if let Some(session) = &self.session {
            session.stop();
        }
        self.streaming = false;
        self.conversation.finish_live();
        self.session = None;
        debug!("Stream stopped by user");
    }

    /// Applies one stream event to the conversation.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Delta(text) => {
                // Deltas queued before a stop was observed are discarded.
                if self.streaming {
                    self.conversation.append_live(&text);
                }
            }
            StreamEvent::Done => {
                self.conversation.finish_live();
                self.streaming = false;
                self.session = None;
            }
            StreamEvent::Failed(reason) => {
                warn!(error = %reason, "Stream failed");
                if self.streaming {
                    self.conversation.set_live(ERROR_NOTICE);
                }
                self.conversation.finish_live();
                self.streaming = false;
                self.session = None;
            }
        }
    }
}

/// Performs the relay request and consumes its byte stream.
async fn run_stream(
    http: reqwest::Client,
    endpoint: String,
    request: ChatRequest,
    session: StreamSession,
    updates: mpsc::UnboundedSender<StreamEvent>,
) -> Result<(), StreamError> {
    let response = http
        .post(&endpoint)
        .json(&request)
        .send()
        .await
        .map_err(|e| StreamError::Request(e.to_string()))?
        .error_for_status()
        .map_err(|e| StreamError::Request(e.to_string()))?;

    consume(response.bytes_stream(), &session, &updates).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::Role;

    fn make_controller() -> (ChatController, mpsc::UnboundedReceiver<StreamEvent>) {
        ChatController::new("http://127.0.0.1:1/api/chat")
    }

    #[tokio::test]
    async fn send_appends_user_message_and_placeholder() {
        let (mut controller, _rx) = make_controller();
        assert!(controller.send("What is 2+2?"));

        let messages = controller.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "What is 2+2?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "");
        assert!(controller.is_streaming());
    }

    #[tokio::test]
    async fn send_is_noop_for_whitespace_input() {
        let (mut controller, _rx) = make_controller();
        assert!(!controller.send("   "));
        assert!(controller.conversation().messages().is_empty());
        assert!(!controller.is_streaming());
    }

    #[tokio::test]
    async fn send_is_noop_while_streaming() {
        let (mut controller, _rx) = make_controller();
        assert!(controller.send("first"));
        assert!(!controller.send("second"));
        assert_eq!(controller.conversation().messages().len(), 2);
    }

    #[tokio::test]
    async fn stop_marks_inactive_immediately_and_keeps_partial_content() {
        let (mut controller, _rx) = make_controller();
        controller.send("question");
        controller.apply(StreamEvent::Delta("par".to_string()));
        controller.apply(StreamEvent::Delta("tial".to_string()));

        controller.stop();
        assert!(!controller.is_streaming());

        // Deltas already queued when stop was observed are discarded.
        controller.apply(StreamEvent::Delta(" more".to_string()));
        controller.apply(StreamEvent::Done);

        let last = controller.conversation().messages().last().expect("reply");
        assert_eq!(last.content, "partial");
    }

    #[tokio::test]
    async fn failed_event_replaces_placeholder_with_error_notice() {
        let (mut controller, _rx) = make_controller();
        controller.send("question");
        controller.apply(StreamEvent::Delta("par".to_string()));
        controller.apply(StreamEvent::Failed("boom".to_string()));

        let last = controller.conversation().messages().last().expect("reply");
        assert_eq!(last.content, ERROR_NOTICE);
        assert!(!controller.is_streaming());
    }

    #[tokio::test]
    async fn failed_after_stop_leaves_content_untouched() {
        let (mut controller, _rx) = make_controller();
        controller.send("question");
        controller.apply(StreamEvent::Delta("4".to_string()));
        controller.stop();
        controller.apply(StreamEvent::Failed("late".to_string()));

        let last = controller.conversation().messages().last().expect("reply");
        assert_eq!(last.content, "4");
    }

    #[tokio::test]
    async fn done_finalizes_stream() {
        let (mut controller, _rx) = make_controller();
        controller.send("question");
        controller.apply(StreamEvent::Delta("4".to_string()));
        controller.apply(StreamEvent::Done);

        assert!(!controller.is_streaming());
        assert!(!controller.conversation().has_live());
        let last = controller.conversation().messages().last().expect("reply");
        assert_eq!(last.content, "4");
    }
}
