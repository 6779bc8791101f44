//! Error types for the Tachigoma domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

// --- Bounded context errors ---

/// Failures talking to the remote completion service.
///
/// `Network`, `Serialization`, `ApiError`, `AuthenticationFailed` and
/// `RateLimited` are setup failures: the request never produced a stream.
/// `StreamInterrupted` is a read failure after the stream had started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("API request failed with status {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider (status 429): {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Error reading stream: {0}")]
    StreamInterrupted(String),

    #[error("Error encoding request: {0}")]
    Serialization(String),

    #[error("Error making request: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether this error happened before any stream event was produced.
    pub fn is_setup_failure(&self) -> bool {
        !matches!(self, Self::StreamInterrupted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("{reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("invalid arguments for {tool_name}: {reason}")]
    InvalidArguments { tool_name: String, reason: String },
}

impl ToolError {
    pub fn failed(tool_name: &str, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid(tool_name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool_name: tool_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the agent orchestrator to the presentation layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    #[error("a turn is already in progress (state: {0})")]
    Busy(String),

    #[error("no tool call is awaiting confirmation")]
    NotConfirming,

    #[error("tool {0} not found in registry")]
    ToolNotFound(String),

    #[error("tool result for unknown tool call id {0}")]
    UnknownToolCall(String),

    #[error("tool call {0} already has a result")]
    AlreadyAnswered(String),

    #[error("tool call {0} is not next in the queue")]
    OutOfOrder(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("turn interrupted by user")]
    Interrupted,
}
