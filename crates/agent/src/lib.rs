//! The agent orchestrator for Tachigoma.
//!
//! The agent runs one **turn** per user input:
//!
//! 1. **Append** the user message to history
//! 2. **Stream** the model's answer through the completion client
//! 3. **If tool calls**: run them one at a time (asking the user first for
//!    the ones that require it), append each result, go back to step 2
//! 4. **If text only**: the turn is over
//!
//! There is no iteration limit; a model that keeps calling tools keeps the
//! turn going until the user cancels it.

pub mod orchestrator;
pub mod stream_event;
pub mod view;

#[cfg(test)]
mod test_helpers;

pub use orchestrator::{Agent, AgentState};
pub use stream_event::AgentEvent;
pub use view::{ViewState, render_messages};
