//! Completion client implementations for Tachigoma.
//!
//! All clients implement the `tachigoma_core::CompletionClient` trait.

pub mod openai_compat;
pub mod sse;

pub use openai_compat::OpenAiCompatClient;
pub use sse::{ToolCallAggregator, ToolCallDelta, decode_line};
