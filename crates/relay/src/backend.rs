//! Completion backend abstraction and OpenAI-compatible implementation.

use std::pin::Pin;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use proto::{RelayError, Role, WireMessage};
use tracing::debug;

/// Fixed persona instruction prepended to every upstream request.
const SYSTEM_PROMPT: &str = "You are a calm study assistant. Explain concepts \
step-by-step using simple language, bullet points, and examples. Avoid emojis.";

/// Fixed upstream model identifier.
const MODEL: &str = "openai/gpt-oss-20b";

/// Low sampling temperature for deterministic, focused explanations.
const TEMPERATURE: f32 = 0.4;

/// A stream of incremental assistant text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, RelayError>> + Send>>;

/// Streaming completion provider trait
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Starts a streamed completion over the given conversation history.
    async fn stream_completion(&self, messages: &[WireMessage])
    -> Result<FragmentStream, RelayError>;
}

/// OpenAI-compatible backend (works with Groq, together.ai, etc.)
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAiBackend {
    /// Creates a backend using the default API base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
        }
    }

    /// Creates a backend with a custom API base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn stream_completion(
        &self,
        messages: &[WireMessage],
    ) -> Result<FragmentStream, RelayError> {
        let mut upstream_messages = Vec::with_capacity(messages.len() + 1);
        upstream_messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| RelayError::Upstream(e.to_string()))?,
        ));
        for m in messages {
            upstream_messages.push(convert_message(m)?);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(MODEL)
            .temperature(TEMPERATURE)
            .stream(true)
            .messages(upstream_messages)
            .build()
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        debug!(
            model = MODEL,
            messages = messages.len(),
            "Starting upstream completion stream"
        );

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        // Fragments with no text content are skipped rather than forwarded
        // as empty writes.
        let fragments = stream.filter_map(|item| async move {
            match item {
                Ok(chunk) => forwardable(
                    chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content),
                )
                .map(Ok),
                Err(e) => Some(Err(RelayError::Upstream(e.to_string()))),
            }
        });

        Ok(Box::pin(fragments))
    }
}

/// Converts a wire message into the upstream request format.
fn convert_message(m: &WireMessage) -> Result<ChatCompletionRequestMessage, RelayError> {
    match m.role {
        Role::User => Ok(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(m.content.clone())
                .build()
                .map_err(|e| RelayError::Upstream(e.to_string()))?,
        )),
        Role::Assistant => Ok(ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(m.content.clone())
                .build()
                .map_err(|e| RelayError::Upstream(e.to_string()))?,
        )),
    }
}

/// Returns the delta text to forward, or `None` for absent/empty fragments.
fn forwardable(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}
