//! Agent-level events.
//!
//! `AgentEvent` lifts protocol events from the completion client, tool
//! dispatch and confirmation requests into one stream the presentation layer
//! consumes through `Agent::next_event`.

use serde::{Deserialize, Serialize};
use tachigoma_core::ToolCall;

/// Events emitted by the agent while a turn is running.
///
/// - `stream_start`: the model began answering
/// - `content_chunk`: partial text from the model
/// - `tool_call_request`: the model asked for one or more tools
/// - `confirmation_required`: a tool call waits for the user's decision
/// - `tool_result`: a tool call produced its textual outcome
/// - `error`: the turn stopped on an error
/// - `stream_end`: the model finished this response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    StreamStart,

    ContentChunk { content: String },

    ToolCallRequest { calls: Vec<ToolCall> },

    ConfirmationRequired { call: ToolCall },

    ToolResult {
        id: String,
        name: String,
        output: String,
    },

    Error { message: String },

    StreamEnd,
}

impl AgentEvent {
    /// Wire name of this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StreamStart => "stream_start",
            Self::ContentChunk { .. } => "content_chunk",
            Self::ToolCallRequest { .. } => "tool_call_request",
            Self::ConfirmationRequired { .. } => "confirmation_required",
            Self::ToolResult { .. } => "tool_result",
            Self::Error { .. } => "error",
            Self::StreamEnd => "stream_end",
        }
    }
}
