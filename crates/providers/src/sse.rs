//! Server-sent event decoding for chat-completion streams.
//!
//! The body of a streaming response is a sequence of `data: <json>` lines
//! terminated by `data: [DONE]`. Each JSON payload carries a delta with an
//! optional content fragment and optional tool-call fragments.

use serde::Deserialize;
use tachigoma_core::ToolCall;
use tracing::trace;

/// The outcome of decoding one line of the event stream.
#[derive(Debug, PartialEq)]
pub enum SseLine {
    /// Blank line, comment, non-data field or unparseable payload.
    Skip,
    /// The `[DONE]` sentinel.
    Done,
    /// A parsed delta for the first choice.
    Delta(StreamDelta),
}

/// Decode a single line (without its `\n` terminator).
pub fn decode_line(line: &str) -> SseLine {
    let line = line.trim_end_matches('\r');
    let Some(data) = line.strip_prefix("data: ") else {
        return SseLine::Skip;
    };

    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<StreamResponse>(data) {
        Ok(resp) => SseLine::Delta(
            resp.choices
                .into_iter()
                .next()
                .map(|choice| StreamDelta {
                    finish_reason: choice.finish_reason,
                    ..choice.delta
                })
                .unwrap_or_default(),
        ),
        Err(e) => {
            trace!(data = %data, error = %e, "Ignoring unparseable SSE chunk");
            SseLine::Skip
        }
    }
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// Bytes are buffered until a full line is available so multi-byte UTF-8
/// sequences split across network chunks decode intact. A trailing partial
/// line left when the stream ends is discarded.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Pop the next complete line, if any.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }
}

// --- Wire shapes (internal) ---

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// The incremental payload of one event line.
#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
    #[serde(skip)]
    pub finish_reason: Option<String>,
}

/// A fragment of one tool call, addressed by its position in the response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolCallDelta {
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

/// One in-progress tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallBuilder {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCallBuilder {
    /// A builder is usable once it has both an id and a function name.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }

    fn build(self) -> ToolCall {
        ToolCall {
            id: self.id,
            kind: if self.kind.is_empty() {
                "function".into()
            } else {
                self.kind
            },
            name: self.name,
            arguments: self.arguments,
        }
    }
}

/// Folds tool-call fragments into complete calls.
///
/// Slots are addressed by the delta's `index` and created on demand. `id` and
/// `type` keep the last non-empty value seen; name and argument fragments are
/// concatenated in arrival order.
#[derive(Debug, Default)]
pub struct ToolCallAggregator {
    slots: Vec<ToolCallBuilder>,
}

impl ToolCallAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, delta: &ToolCallDelta) {
        if delta.index >= self.slots.len() {
            self.slots.resize_with(delta.index + 1, ToolCallBuilder::default);
        }
        let slot = &mut self.slots[delta.index];

        if let Some(id) = delta.id.as_deref().filter(|s| !s.is_empty()) {
            slot.id = id.to_string();
        }
        if let Some(kind) = delta.kind.as_deref().filter(|s| !s.is_empty()) {
            slot.kind = kind.to_string();
        }
        if let Some(function) = &delta.function {
            if let Some(name) = &function.name {
                slot.name.push_str(name);
            }
            if let Some(arguments) = &function.arguments {
                slot.arguments.push_str(arguments);
            }
        }
    }

    pub fn slots(&self) -> &[ToolCallBuilder] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The complete calls in index order. Slots missing an id or name are dropped.
    pub fn finish(self) -> Vec<ToolCall> {
        self.slots
            .into_iter()
            .filter(ToolCallBuilder::is_complete)
            .map(ToolCallBuilder::build)
            .collect()
    }
}
