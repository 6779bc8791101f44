//! # Tachigoma Core
//!
//! Domain types, traits, and error definitions for the Tachigoma terminal
//! agent. Every other crate depends inward on this one.
//!
//! ## Design Philosophy
//!
//! The two seams of the system are traits defined here:
//! - [`CompletionClient`]: the remote model, consumed as an event stream
//! - [`Tool`]: a local capability the model may invoke
//!
//! Implementations live in their own crates, and tests swap in scripted ones.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, ProviderError, ToolError};
pub use message::{Conversation, ConversationId, Message, Role, ToolCall};
pub use provider::{CompletionClient, CompletionRequest, EventStream, ProtocolEvent, ToolDefinition};
pub use tool::{Tool, ToolRegistry, parse_arguments};
