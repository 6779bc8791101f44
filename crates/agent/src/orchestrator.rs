//! The turn-taking state machine.
//!
//! One [`Agent`] owns the conversation history. A turn starts with
//! [`Agent::submit_user_input`] and ends when the model answers without
//! requesting tools. In between, the agent streams model output, runs the
//! requested tools one at a time in FIFO order, and pauses for the user's
//! decision on tools that require confirmation.
//!
//! Nothing runs unless the caller pulls: [`Agent::next_event`] waits on
//! whatever is active (the network stream or the running tool), folds the
//! outcome into history and returns the resulting [`AgentEvent`]s one by one.
//! When it returns `None` the agent is either idle or waiting for
//! [`Agent::resolve_confirmation`].

use std::collections::VecDeque;
use std::sync::Arc;

use tachigoma_core::error::AgentError;
use tachigoma_core::message::{Conversation, Message, ToolCall};
use tachigoma_core::provider::{CompletionClient, CompletionRequest, EventStream, ProtocolEvent};
use tachigoma_core::tool::{Tool, ToolRegistry};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::stream_event::AgentEvent;
use crate::view::ViewState;

/// Where the agent is in the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Streaming,
    AwaitingToolResult,
    AwaitingConfirmation,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Streaming => "streaming",
            Self::AwaitingToolResult => "awaiting tool result",
            Self::AwaitingConfirmation => "awaiting confirmation",
        };
        f.write_str(s)
    }
}

/// Per-turn bookkeeping.
#[derive(Debug, Default)]
struct TurnState {
    /// Calls not yet started. The head is the one awaiting confirmation, if any.
    pending: VecDeque<ToolCall>,
    confirming: Option<ToolCall>,
    streaming_buffer: String,
}

/// The single source of events the agent is waiting on.
enum Activity {
    None,
    Stream(EventStream),
    Tool {
        call: ToolCall,
        task: JoinHandle<String>,
    },
}

/// The agent orchestrator.
pub struct Agent {
    client: Arc<dyn CompletionClient>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,

    conversation: Conversation,
    state: AgentState,
    turn: TurnState,
    activity: Activity,
    outbox: VecDeque<AgentEvent>,
    last_error: Option<AgentError>,
}

impl Agent {
    /// Create a new agent with an empty history.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tools,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            conversation: Conversation::new(),
            state: AgentState::Idle,
            turn: TurnState::default(),
            activity: Activity::None,
            outbox: VecDeque::new(),
            last_error: None,
        }
    }

    /// Place a system message at the start of the history.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        if self.conversation.is_empty() && !prompt.trim().is_empty() {
            self.conversation.push(Message::system(prompt));
        }
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Calls of the current batch that have not started yet.
    pub fn pending_tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.turn.pending.iter()
    }

    /// The error that ended the most recent turn, if any.
    pub fn last_error(&self) -> Option<&AgentError> {
        self.last_error.as_ref()
    }

    /// Snapshot for rendering.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            messages: self.conversation.messages().to_vec(),
            live_streamed_content: self.turn.streaming_buffer.clone(),
            is_confirming: self.state == AgentState::AwaitingConfirmation,
            confirming_tool_call: self.turn.confirming.clone(),
        }
    }

    /// Start a turn. Only accepted while idle.
    pub fn submit_user_input(&mut self, text: impl Into<String>) -> Result<(), AgentError> {
        if self.state != AgentState::Idle {
            return Err(AgentError::Busy(self.state.to_string()));
        }

        self.last_error = None;
        self.turn = TurnState::default();
        self.conversation.push(Message::user(text));
        info!(conversation_id = %self.conversation.id, "User turn started");
        self.start_stream();
        Ok(())
    }

    /// Answer the pending confirmation. `false` feeds a denial back to the
    /// model as the call's result and the turn continues.
    pub fn resolve_confirmation(&mut self, approved: bool) -> Result<(), AgentError> {
        if self.state != AgentState::AwaitingConfirmation {
            return Err(AgentError::NotConfirming);
        }
        let Some(call) = self.turn.confirming.take() else {
            return Err(AgentError::NotConfirming);
        };
        if self.turn.pending.front().is_some_and(|c| c.id == call.id) {
            self.turn.pending.pop_front();
        }

        if !approved {
            info!(tool = %call.name, "Tool call denied by user");
            let denial = format!("User denied execution of tool: {}", call.name);
            self.apply_tool_result(call, denial);
            return Ok(());
        }

        match self.tools.get(&call.name) {
            Some(tool) => self.spawn_tool(tool, call),
            None => self.fail_registry_miss(&call),
        }
        Ok(())
    }

    /// Feed a result for a requested tool call from outside the agent.
    ///
    /// Only the call the turn is on can be answered: the running one (its
    /// task is aborted and this text is used instead), the one awaiting
    /// confirmation, or the head of the queue.
    pub fn supply_tool_result(
        &mut self,
        tool_call_id: &str,
        text: impl Into<String>,
    ) -> Result<(), AgentError> {
        match self.state {
            AgentState::Streaming => return Err(AgentError::Busy(self.state.to_string())),
            AgentState::Idle => return Err(self.not_outstanding(tool_call_id)),
            AgentState::AwaitingToolResult | AgentState::AwaitingConfirmation => {}
        }

        let call = match std::mem::replace(&mut self.activity, Activity::None) {
            Activity::Tool { call, task } if call.id == tool_call_id => {
                debug!(tool = %call.name, "Running tool superseded by supplied result");
                task.abort();
                call
            }
            running @ Activity::Tool { .. } => {
                self.activity = running;
                return Err(AgentError::Busy(self.state.to_string()));
            }
            other => {
                self.activity = other;
                if self.turn.pending.front().is_none_or(|c| c.id != tool_call_id) {
                    return Err(self.not_outstanding(tool_call_id));
                }
                self.turn.confirming = None;
                match self.turn.pending.pop_front() {
                    Some(call) => call,
                    None => return Err(self.not_outstanding(tool_call_id)),
                }
            }
        };

        self.apply_tool_result(call, text.into());
        Ok(())
    }

    /// Abandon the current turn.
    ///
    /// Drops the stream subscription (which stops the network worker) and
    /// aborts a running tool. Returns `false` if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if self.state == AgentState::Idle && matches!(self.activity, Activity::None) {
            return false;
        }

        match std::mem::replace(&mut self.activity, Activity::None) {
            Activity::Tool { call, task } => {
                debug!(tool = %call.name, "Aborting running tool");
                task.abort();
            }
            Activity::Stream(stream) => drop(stream),
            Activity::None => {}
        }

        warn!(conversation_id = %self.conversation.id, state = %self.state, "Turn interrupted");
        self.outbox.clear();
        self.turn = TurnState::default();
        self.state = AgentState::Idle;
        self.report(AgentError::Interrupted);
        true
    }

    /// Wait for the next event of the current turn.
    ///
    /// Returns `None` when nothing is in progress: the turn ended, or it is
    /// paused on a confirmation.
    pub async fn next_event(&mut self) -> Option<AgentEvent> {
        loop {
            if let Some(event) = self.outbox.pop_front() {
                return Some(event);
            }

            match &mut self.activity {
                Activity::None => return None,
                Activity::Stream(stream) => {
                    let event = stream.recv().await;
                    match event {
                        Some(event) => self.handle_protocol_event(event),
                        None => {
                            debug!("Event stream closed without StreamEnd");
                            self.finish_stream();
                        }
                    }
                }
                Activity::Tool { call, task } => {
                    let output = match task.await {
                        Ok(output) => output,
                        Err(e) => format!("Error executing tool {}: {e}", call.name),
                    };
                    let call = call.clone();
                    self.activity = Activity::None;
                    self.apply_tool_result(call, output);
                }
            }
        }
    }

    // --- Internal transitions ---

    fn start_stream(&mut self) {
        let request = CompletionRequest::new(&self.model, self.conversation.messages().to_vec())
            .with_tools(self.tools.definitions())
            .streaming();
        let request = CompletionRequest {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..request
        };

        debug!(
            conversation_id = %self.conversation.id,
            messages = request.messages.len(),
            "Requesting completion"
        );
        self.turn.streaming_buffer.clear();
        self.activity = Activity::Stream(self.client.stream_completion(request));
        self.state = AgentState::Streaming;
    }

    fn handle_protocol_event(&mut self, event: ProtocolEvent) {
        match event {
            ProtocolEvent::StreamStart => {
                self.conversation.push(Message::assistant(""));
                self.emit(AgentEvent::StreamStart);
            }
            ProtocolEvent::ContentChunk(chunk) => {
                self.turn.streaming_buffer.push_str(&chunk);
                if self.conversation.append_to_last_assistant(&chunk).is_none() {
                    self.conversation.push(Message::assistant(chunk.clone()));
                }
                self.emit(AgentEvent::ContentChunk { content: chunk });
            }
            ProtocolEvent::AssistantToolCallRequest(message) => {
                let calls = message.tool_calls.clone();
                if !self.conversation.attach_tool_calls(&calls) {
                    self.conversation.push(message);
                }
                debug!(count = calls.len(), "Model requested tools");
                self.turn.pending = calls.iter().cloned().collect();
                self.state = AgentState::AwaitingToolResult;
                self.emit(AgentEvent::ToolCallRequest { calls });
            }
            ProtocolEvent::Error(e) => {
                warn!(error = %e, mid_stream = !e.is_setup_failure(), "Completion failed");
                self.activity = Activity::None;
                self.turn = TurnState::default();
                self.state = AgentState::Idle;
                self.report(AgentError::Provider(e));
            }
            ProtocolEvent::StreamEnd => self.finish_stream(),
        }
    }

    fn finish_stream(&mut self) {
        self.activity = Activity::None;
        self.emit(AgentEvent::StreamEnd);

        if self.state == AgentState::AwaitingToolResult && !self.turn.pending.is_empty() {
            self.dispatch_next_call();
        } else {
            self.turn = TurnState::default();
            self.state = AgentState::Idle;
            info!(conversation_id = %self.conversation.id, "Turn complete");
        }
    }

    /// Look at the head of the queue and start it, ask for confirmation, or
    /// stop the turn on a registry miss. With an empty queue the model is
    /// asked again.
    fn dispatch_next_call(&mut self) {
        let Some(call) = self.turn.pending.front().cloned() else {
            self.start_stream();
            return;
        };

        let Some(tool) = self.tools.get(&call.name) else {
            self.fail_registry_miss(&call);
            return;
        };

        if tool.requires_confirmation() {
            debug!(tool = %call.name, "Tool call awaiting confirmation");
            self.turn.confirming = Some(call.clone());
            self.state = AgentState::AwaitingConfirmation;
            self.emit(AgentEvent::ConfirmationRequired { call });
            return;
        }

        self.turn.pending.pop_front();
        self.spawn_tool(tool, call);
    }

    fn spawn_tool(&mut self, tool: Arc<dyn Tool>, call: ToolCall) {
        debug!(tool = %call.name, id = %call.id, "Executing tool");
        let arguments = call.arguments.clone();
        let name = call.name.clone();
        let task = tokio::spawn(async move {
            match tool.execute(&arguments).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(tool = %name, error = %e, "Tool execution failed");
                    format!("Error executing tool {name}: {e}")
                }
            }
        });
        self.activity = Activity::Tool { call, task };
        self.state = AgentState::AwaitingToolResult;
    }

    /// Record a tool outcome, then continue with the queue or the model.
    fn apply_tool_result(&mut self, call: ToolCall, output: String) {
        self.conversation
            .push(Message::tool_result(call.id.as_str(), output.as_str()));
        self.emit(AgentEvent::ToolResult {
            id: call.id,
            name: call.name,
            output,
        });
        self.state = AgentState::AwaitingToolResult;
        self.dispatch_next_call();
    }

    /// The remaining calls of the batch are left in the queue and never run.
    fn fail_registry_miss(&mut self, call: &ToolCall) {
        warn!(tool = %call.name, "Tool not found in registry");
        self.activity = Activity::None;
        self.turn.confirming = None;
        self.state = AgentState::Idle;
        self.report(AgentError::ToolNotFound(call.name.clone()));
    }

    /// Why a supplied result cannot be taken for this id.
    fn not_outstanding(&self, tool_call_id: &str) -> AgentError {
        let id = tool_call_id.to_string();
        if !self.conversation.has_tool_call(tool_call_id) {
            AgentError::UnknownToolCall(id)
        } else if self.conversation.has_tool_result(tool_call_id) {
            AgentError::AlreadyAnswered(id)
        } else if self.turn.pending.iter().any(|c| c.id == tool_call_id) {
            AgentError::OutOfOrder(id)
        } else {
            AgentError::UnknownToolCall(id)
        }
    }

    fn report(&mut self, error: AgentError) {
        self.emit(AgentEvent::Error {
            message: error.to_string(),
        });
        self.last_error = Some(error);
    }

    fn emit(&mut self, event: AgentEvent) {
        self.outbox.push_back(event);
    }
}
