//! Completion client trait: the abstraction over the remote model service.
//!
//! A `CompletionClient` sends the conversation to a chat-completion endpoint
//! and turns the incremental response into a typed [`ProtocolEvent`]
//! sequence delivered through an [`EventStream`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::error::ProviderError;
use crate::message::{Message, ToolCall};

/// One request against the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gpt-4o")
    pub model: String,

    /// The full conversation history
    pub messages: Vec<Message>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,

    /// Sampling temperature; provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            stream: false,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// Events produced by a streaming completion, in order.
///
/// A setup failure yields a lone `Error`. A started stream yields
/// `StreamStart`, any number of `ContentChunk`s, at most one `Error`
/// (mid-stream read failure), at most one `AssistantToolCallRequest`,
/// and always ends with `StreamEnd`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    StreamStart,
    ContentChunk(String),
    AssistantToolCallRequest(Message),
    Error(ProviderError),
    StreamEnd,
}

/// Single-consumer queue of protocol events fed by a background worker.
///
/// Dropping the stream aborts the worker task, so discarding a subscription
/// also stops the network read.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<ProtocolEvent>,
    worker: Option<AbortHandle>,
}

impl EventStream {
    pub fn new(rx: mpsc::Receiver<ProtocolEvent>, worker: Option<AbortHandle>) -> Self {
        Self { rx, worker }
    }

    /// A stream that replays a fixed event list and then closes.
    pub fn from_events(events: Vec<ProtocolEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event, so this cannot fail.
            let _ = tx.try_send(event);
        }
        Self::new(rx, None)
    }

    /// Wait for the next event; `None` once the worker has finished.
    pub async fn recv(&mut self) -> Option<ProtocolEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

/// The completion client trait.
///
/// The agent only talks to this trait, which lets tests substitute scripted
/// clients for the HTTP implementation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// A human-readable name for this client (e.g., "openai").
    fn name(&self) -> &str;

    /// Start a streaming completion. Must be called from within a tokio runtime.
    ///
    /// Never fails directly: setup failures arrive as a single
    /// `ProtocolEvent::Error` on the returned stream.
    fn stream_completion(&self, request: CompletionRequest) -> EventStream;

    /// Run a completion to the end and return the assistant message.
    ///
    /// Default implementation folds the event stream.
    async fn complete(&self, request: CompletionRequest) -> Result<Message, ProviderError> {
        let mut stream = self.stream_completion(request.streaming());
        let mut content = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();

        while let Some(event) = stream.recv().await {
            match event {
                ProtocolEvent::ContentChunk(chunk) => content.push_str(&chunk),
                ProtocolEvent::AssistantToolCallRequest(message) => tool_calls = message.tool_calls,
                ProtocolEvent::Error(e) => return Err(e),
                ProtocolEvent::StreamStart => {}
                ProtocolEvent::StreamEnd => break,
            }
        }

        let mut message = Message::assistant(content);
        message.tool_calls = tool_calls;
        Ok(message)
    }
}
