//! OpenAI-compatible completion client.
//!
//! Works with any endpoint exposing `POST {base_url}/chat/completions`:
//! OpenAI, OpenRouter, Ollama, vLLM, LiteLLM and local proxies.
//!
//! Supports:
//! - Streaming chat completions (SSE) with tool-call aggregation
//! - Non-streaming chat completions

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tachigoma_config::AppConfig;
use tachigoma_core::error::ProviderError;
use tachigoma_core::message::{Message, Role, ToolCall};
use tachigoma_core::provider::*;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::sse::{LineBuffer, SseLine, ToolCallAggregator, decode_line};

/// Capacity of the per-request event queue.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// An OpenAI-compatible completion client.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new client. No request timeout is applied: a stalled
    /// stream waits until the turn is cancelled.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            "openai",
            config.api_url.as_str(),
            config.api_key.clone().unwrap_or_default(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Serialize the request body.
    fn request_body(request: &CompletionRequest, stream: bool) -> Result<Vec<u8>, ProviderError> {
        let body = ApiRequest {
            model: &request.model,
            messages: to_api_messages(&request.messages),
            stream,
            tools: to_api_tools(&request.tools),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        serde_json::to_vec(&body).map_err(|e| ProviderError::Serialization(e.to_string()))
    }

    /// Send the request and return the response if it has a 2xx status.
    async fn send(
        client: &reqwest::Client,
        url: &str,
        api_key: &str,
        body: Vec<u8>,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let mut builder = client
            .post(url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json");
        if stream {
            builder = builder.header("Accept", "text/event-stream");
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %error_body, "Completion endpoint returned error");
        Err(status_error(status.as_u16(), error_body))
    }
}

/// Map a non-2xx status onto the provider error taxonomy.
fn status_error(status: u16, body: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthenticationFailed(if body.is_empty() {
            "Invalid API key or insufficient permissions".into()
        } else {
            body
        }),
        429 => ProviderError::RateLimited(body),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// Read the response body and push protocol events until it ends.
///
/// Returns early only when the receiver is gone.
async fn pump_events(response: reqwest::Response, tx: mpsc::Sender<ProtocolEvent>) {
    if tx.send(ProtocolEvent::StreamStart).await.is_err() {
        return;
    }

    let mut byte_stream = response.bytes_stream();
    let mut lines = LineBuffer::new();
    let mut aggregator = ToolCallAggregator::new();

    'read: while let Some(chunk) = byte_stream.next().await {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Stream read failed");
                let err = ProviderError::StreamInterrupted(e.to_string());
                if tx.send(ProtocolEvent::Error(err)).await.is_err() {
                    return;
                }
                break;
            }
        };

        lines.extend(&bytes);
        while let Some(line) = lines.next_line() {
            let delta = match decode_line(&line) {
                SseLine::Skip => continue,
                SseLine::Done => break 'read,
                SseLine::Delta(delta) => delta,
            };

            if let Some(reason) = delta.finish_reason.as_deref() {
                trace!(finish_reason = reason, "Choice finished");
            }
            for tc in delta.tool_calls.iter().flatten() {
                aggregator.apply(tc);
            }

            if let Some(content) = delta.content.filter(|c| !c.is_empty())
                && tx.send(ProtocolEvent::ContentChunk(content)).await.is_err()
            {
                return;
            }
        }
    }

    let tool_calls = aggregator.finish();
    if !tool_calls.is_empty() {
        debug!(count = tool_calls.len(), "Assembled tool calls from stream");
        let request = Message::assistant_tool_calls(tool_calls);
        if tx
            .send(ProtocolEvent::AssistantToolCallRequest(request))
            .await
            .is_err()
        {
            return;
        }
    }

    let _ = tx.send(ProtocolEvent::StreamEnd).await;
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn stream_completion(&self, request: CompletionRequest) -> EventStream {
        let body = match Self::request_body(&request, true) {
            Ok(body) => body,
            Err(e) => return EventStream::from_events(vec![ProtocolEvent::Error(e)]),
        };

        debug!(
            client = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending streaming request"
        );

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let client = self.client.clone();
        let url = self.endpoint();
        let api_key = self.api_key.clone();

        let worker = tokio::spawn(async move {
            match Self::send(&client, &url, &api_key, body, true).await {
                Ok(response) => pump_events(response, tx).await,
                Err(e) => {
                    let _ = tx.send(ProtocolEvent::Error(e)).await;
                }
            }
        });

        EventStream::new(rx, Some(worker.abort_handle()))
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Message, ProviderError> {
        let body = Self::request_body(&request, false)?;
        debug!(client = %self.name, model = %request.model, "Sending completion request");

        let response = Self::send(&self.client, &self.endpoint(), &self.api_key, body, false).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                kind: tc.r#type,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();
        Ok(message)
    }
}

/// Convert our Message types to the chat-completions wire format.
fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
    messages
        .iter()
        .map(|m| ApiMessage {
            role: m.role.as_str().into(),
            content: match m.role {
                // An assistant turn that only requested tools has no text.
                Role::Assistant if m.content.is_empty() && !m.tool_calls.is_empty() => None,
                _ => Some(m.content.clone()),
            },
            tool_calls: if m.tool_calls.is_empty() {
                None
            } else {
                Some(
                    m.tool_calls
                        .iter()
                        .map(|tc| ApiToolCall {
                            id: tc.id.clone(),
                            r#type: tc.kind.clone(),
                            function: ApiFunction {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                        .collect(),
                )
            },
            tool_call_id: m.tool_call_id.clone(),
        })
        .collect()
}

/// Convert tool definitions to the wire format.
fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
    tools
        .iter()
        .map(|t| ApiToolDefinition {
            r#type: "function".into(),
            function: ApiToolFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            },
        })
        .collect()
}

// --- Chat-completions API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: ApiFunction,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse_body(lines: &[&str]) -> String {
        let mut body = String::new();
        for line in lines {
            body.push_str("data: ");
            body.push_str(line);
            body.push_str("\n\n");
        }
        body
    }

    async fn mount_sse(server: &MockServer, body: String) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(server)
            .await;
    }

    async fn collect(mut stream: EventStream) -> Vec<ProtocolEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.recv().await {
            events.push(event);
        }
        events
    }

    fn client_for(server: &MockServer) -> OpenAiCompatClient {
        OpenAiCompatClient::new("test", format!("{}/v1", server.uri()), "sk-test")
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("gpt-test", vec![Message::user("hi")])
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OpenAiCompatClient::new("openai", "http://localhost:3000/v1/", "k");
        assert_eq!(client.base_url(), "http://localhost:3000/v1");
        assert_eq!(client.endpoint(), "http://localhost:3000/v1/chat/completions");
    }

    #[test]
    fn from_config_uses_url_and_key() {
        let config = AppConfig {
            api_key: Some("sk-cfg".into()),
            ..AppConfig::default()
        };
        let client = OpenAiCompatClient::from_config(&config);
        assert_eq!(client.base_url(), "http://localhost:3000/v1");
        assert_eq!(client.api_key, "sk-cfg");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("You are helpful"), Message::user("Hello")];
        let api_messages = to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
    }

    #[test]
    fn message_conversion_with_tool_calls() {
        let msg = Message::assistant_tool_calls(vec![ToolCall::function(
            "call_1",
            "run_shell_command",
            r#"{"command":"ls"}"#,
        )]);
        let api_msgs = to_api_messages(&[msg]);
        assert!(api_msgs[0].content.is_none());
        let tc = api_msgs[0].tool_calls.as_ref().unwrap();
        assert_eq!(tc[0].function.name, "run_shell_command");
        assert_eq!(tc[0].r#type, "function");
    }

    #[test]
    fn message_conversion_tool_response() {
        let api_msgs = to_api_messages(&[Message::tool_result("call_1", "result data")]);
        assert_eq!(api_msgs[0].role, "tool");
        assert_eq!(api_msgs[0].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn request_body_shape() {
        let req = request().with_tools(vec![ToolDefinition {
            name: "glob".into(),
            description: "Find files".into(),
            parameters: serde_json::json!({"type": "object"}),
        }]);
        let body = OpenAiCompatClient::request_body(&req, true).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["stream"], true);
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "glob");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_error(401, String::new()), ProviderError::AuthenticationFailed(_)));
        assert!(matches!(status_error(403, "no".into()), ProviderError::AuthenticationFailed(_)));
        assert!(matches!(status_error(429, String::new()), ProviderError::RateLimited(_)));
        assert_eq!(
            status_error(500, "boom".into()),
            ProviderError::ApiError {
                status_code: 500,
                message: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn streams_content_chunks_in_order() {
        let server = MockServer::start().await;
        mount_sse(
            &server,
            sse_body(&[
                r#"{"choices":[{"delta":{"role":"assistant"},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{"content":"lo"},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
                "[DONE]",
            ]),
        )
        .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(
            events,
            vec![
                ProtocolEvent::StreamStart,
                ProtocolEvent::ContentChunk("Hel".into()),
                ProtocolEvent::ContentChunk("lo".into()),
                ProtocolEvent::StreamEnd,
            ]
        );
    }

    #[tokio::test]
    async fn aggregates_tool_call_fragments() {
        let server = MockServer::start().await;
        mount_sse(
            &server,
            sse_body(&[
                r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"list_directory","arguments":""}}]}}]}"#,
                r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"path\""}}]}}]}"#,
                r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":":\".\"}"}}]}}]}"#,
                r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
                "[DONE]",
            ]),
        )
        .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ProtocolEvent::StreamStart);
        let ProtocolEvent::AssistantToolCallRequest(msg) = &events[1] else {
            panic!("expected tool call request, got {:?}", events[1]);
        };
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert_eq!(
            msg.tool_calls,
            vec![ToolCall::function("call_1", "list_directory", r#"{"path":"."}"#)]
        );
        assert_eq!(events[2], ProtocolEvent::StreamEnd);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let server = MockServer::start().await;
        let body = format!(
            ": comment\n\ndata: {{broken\n\n{}",
            sse_body(&[r#"{"choices":[{"delta":{"content":"ok"}}]}"#, "[DONE]"])
        );
        mount_sse(&server, body).await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(
            events,
            vec![
                ProtocolEvent::StreamStart,
                ProtocolEvent::ContentChunk("ok".into()),
                ProtocolEvent::StreamEnd,
            ]
        );
    }

    #[tokio::test]
    async fn eof_without_done_ends_normally() {
        let server = MockServer::start().await;
        mount_sse(
            &server,
            sse_body(&[r#"{"choices":[{"delta":{"content":"partial"}}]}"#]),
        )
        .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(events.first(), Some(&ProtocolEvent::StreamStart));
        assert_eq!(events.last(), Some(&ProtocolEvent::StreamEnd));
        assert!(events.contains(&ProtocolEvent::ContentChunk("partial".into())));
    }

    #[tokio::test]
    async fn lines_after_done_are_ignored() {
        let server = MockServer::start().await;
        mount_sse(
            &server,
            sse_body(&[
                r#"{"choices":[{"delta":{"content":"a"}}]}"#,
                "[DONE]",
                r#"{"choices":[{"delta":{"content":"b"}}]}"#,
            ]),
        )
        .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert!(!events.contains(&ProtocolEvent::ContentChunk("b".into())));
    }

    #[tokio::test]
    async fn non_2xx_yields_single_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(
            events,
            vec![ProtocolEvent::Error(ProviderError::ApiError {
                status_code: 500,
                message: "upstream exploded".into(),
            })]
        );
    }

    #[tokio::test]
    async fn unauthorized_yields_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ProtocolEvent::Error(ProviderError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn connection_failure_yields_single_error() {
        // Nothing listens on port 9 locally.
        let client = OpenAiCompatClient::new("test", "http://127.0.0.1:9/v1", "k");
        let events = collect(client.stream_completion(request())).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProtocolEvent::Error(ProviderError::Network(_))));
    }

    #[tokio::test]
    async fn sends_auth_and_stream_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("accept", "text/event-stream"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-test", "stream": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(sse_body(&["[DONE]"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let events = collect(client_for(&server).stream_completion(request())).await;
        assert_eq!(events, vec![ProtocolEvent::StreamStart, ProtocolEvent::StreamEnd]);
    }

    #[tokio::test]
    async fn non_streaming_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cmpl-1",
                "model": "gpt-test",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi there"},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let msg = client_for(&server).complete(request()).await.unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "Hi there");
    }

    #[tokio::test]
    async fn non_streaming_complete_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete(request()).await.unwrap_err();
        assert_eq!(err, ProviderError::RateLimited("slow down".into()));
    }

    /// Read one HTTP request (headers plus `Content-Length` body) off the socket.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending a request");
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn read_failure_still_delivers_tool_calls_and_end() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;

            let line = concat!(
                r#"data: {"choices":[{"delta":{"content":"hi","tool_calls":"#,
                r#"[{"index":0,"id":"c1","type":"function","function":{"name":"glob","arguments":"{}"}}]}}]}"#,
                "\n\n"
            );
            let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n";
            let chunk = format!("{:x}\r\n{line}\r\n", line.len());
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(chunk.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            // Closing without the terminating zero-size chunk breaks the body.
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            drop(socket);
        });

        let client = OpenAiCompatClient::new("test", format!("http://{addr}/v1"), "sk-test");
        let events = collect(client.stream_completion(request())).await;
        server.await.unwrap();

        assert_eq!(events.len(), 5, "{events:?}");
        assert_eq!(events[0], ProtocolEvent::StreamStart);
        assert_eq!(events[1], ProtocolEvent::ContentChunk("hi".into()));
        assert!(matches!(
            events[2],
            ProtocolEvent::Error(ProviderError::StreamInterrupted(_))
        ));
        match &events[3] {
            ProtocolEvent::AssistantToolCallRequest(msg) => {
                assert!(msg.content.is_empty());
                assert_eq!(msg.tool_calls, vec![ToolCall::function("c1", "glob", "{}")]);
            }
            other => panic!("expected tool call request, got {other:?}"),
        }
        assert_eq!(events[4], ProtocolEvent::StreamEnd);
    }
}
