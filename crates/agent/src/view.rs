//! Read-only snapshot of the agent for the presentation layer.

use serde::Serialize;
use tachigoma_core::{Message, Role, ToolCall};

/// What a renderer needs to draw the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub messages: Vec<Message>,
    /// Text streamed so far for the response in progress.
    pub live_streamed_content: String,
    pub is_confirming: bool,
    pub confirming_tool_call: Option<ToolCall>,
}

impl ViewState {
    /// A snapshot of a finished history with no turn in progress.
    pub fn from_history(messages: &[Message]) -> Self {
        Self {
            messages: messages.to_vec(),
            live_streamed_content: String::new(),
            is_confirming: false,
            confirming_tool_call: None,
        }
    }

    /// Render the message list as plain lines.
    ///
    /// Depends only on `messages`, so replaying the same history always gives
    /// the same transcript.
    pub fn transcript(&self) -> Vec<String> {
        render_messages(&self.messages)
    }
}

/// Render messages the way the terminal shows them.
pub fn render_messages(messages: &[Message]) -> Vec<String> {
    let mut lines = Vec::with_capacity(messages.len());
    for m in messages {
        match m.role {
            Role::System => lines.push(format!("System: {}", m.content)),
            Role::User => lines.push(format!("You: {}", m.content)),
            Role::Assistant => {
                if !m.content.is_empty() || m.tool_calls.is_empty() {
                    lines.push(format!("AI: {}", m.content));
                }
                for tc in &m.tool_calls {
                    lines.push(format!("Tool call: {}({})", tc.name, tc.arguments));
                }
            }
            Role::Tool => lines.push(format!(
                "Tool result [{}]: {}",
                m.tool_call_id.as_deref().unwrap_or("?"),
                m.content
            )),
        }
    }
    lines
}
