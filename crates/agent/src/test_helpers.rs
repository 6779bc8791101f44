//! Shared test doubles for orchestrator tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tachigoma_core::error::{ProviderError, ToolError};
use tachigoma_core::message::{Message, ToolCall};
use tachigoma_core::provider::{CompletionClient, CompletionRequest, EventStream, ProtocolEvent};
use tachigoma_core::tool::Tool;
use tokio::sync::{mpsc, oneshot};

use crate::{Agent, AgentEvent};

/// One scripted response.
pub enum Script {
    /// Replay these events, then close.
    Events(Vec<ProtocolEvent>),
    /// Send these events and then stall until the stream is dropped.
    /// `guard` is released when the worker task goes away.
    Hang {
        events: Vec<ProtocolEvent>,
        guard: oneshot::Sender<()>,
    },
}

/// A completion client that plays back scripted responses in order and
/// records every request it receives.
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client whose responses are plain event lists.
    pub fn with_events(responses: Vec<Vec<ProtocolEvent>>) -> Self {
        Self::new(responses.into_iter().map(Script::Events).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    fn stream_completion(&self, request: CompletionRequest) -> EventStream {
        self.requests.lock().unwrap().push(request);
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Events(events)) => EventStream::from_events(events),
            Some(Script::Hang { events, guard }) => {
                let (tx, rx) = mpsc::channel(events.len().max(1));
                let worker = tokio::spawn(async move {
                    let _guard = guard;
                    for event in events {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    std::future::pending::<()>().await;
                });
                EventStream::new(rx, Some(worker.abort_handle()))
            }
            None => panic!("ScriptedClient: no more scripted responses"),
        }
    }
}

/// A content-only response delivered in the given chunks.
pub fn text_response(chunks: &[&str]) -> Vec<ProtocolEvent> {
    let mut events = vec![ProtocolEvent::StreamStart];
    events.extend(chunks.iter().map(|c| ProtocolEvent::ContentChunk(c.to_string())));
    events.push(ProtocolEvent::StreamEnd);
    events
}

/// A response that only requests tool calls.
pub fn tool_response(calls: Vec<ToolCall>) -> Vec<ProtocolEvent> {
    vec![
        ProtocolEvent::StreamStart,
        ProtocolEvent::AssistantToolCallRequest(Message::assistant_tool_calls(calls)),
        ProtocolEvent::StreamEnd,
    ]
}

/// A setup failure.
pub fn error_response(err: ProviderError) -> Vec<ProtocolEvent> {
    vec![ProtocolEvent::Error(err)]
}

/// A tool with a fixed outcome that records the arguments of every call.
pub struct FakeTool {
    name: String,
    confirm: bool,
    outcome: Result<String, String>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeTool {
    pub fn ok(name: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            confirm: false,
            outcome: Ok(output.into()),
            delay: None,
            calls: Arc::default(),
        }
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        Self {
            outcome: Err(reason.into()),
            ..Self::ok(name, "")
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle on the recorded invocations.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Tool for FakeTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    fn requires_confirmation(&self) -> bool {
        self.confirm
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(arguments.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
            .clone()
            .map_err(|reason| ToolError::failed(&self.name, reason))
    }
}

/// Pull events until the agent has nothing left to do.
pub async fn drain(agent: &mut Agent) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    while let Some(event) = agent.next_event().await {
        events.push(event);
    }
    events
}
