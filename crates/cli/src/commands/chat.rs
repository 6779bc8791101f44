//! Interactive mode: a line-oriented session driving the agent.

use std::io::Write;
use std::sync::Arc;

use tachigoma_agent::{Agent, AgentEvent, AgentState};
use tachigoma_config::AppConfig;
use tachigoma_core::{CompletionClient, ToolCall};
use tachigoma_providers::OpenAiCompatClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Longest tool output shown inline, in lines.
const RESULT_PREVIEW_LINES: usize = 8;

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiCompatClient::from_config(config));
    let registry = Arc::new(tachigoma_tools::registry_with(&config.tools.disabled));
    let tool_count = registry.len();

    let mut agent = Agent::new(client, registry, config.model.as_str())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);
    if let Some(prompt) = &config.system_prompt {
        agent = agent.with_system_prompt(prompt.as_str());
    }

    println!("Tachigoma");
    println!("  Model: {} @ {}", config.model, config.api_url);
    println!("  Tools: {tool_count}");
    println!("  Type 'exit' or press Ctrl+D to leave, Ctrl+C to interrupt a turn.");
    println!();

    let mut input = spawn_stdin_reader();

    loop {
        prompt("You > ");
        let line = tokio::select! {
            line = input.recv() => line,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit_command(line) {
            break;
        }

        if let Err(e) = agent.submit_user_input(line) {
            eprintln!("  Error: {e}");
            continue;
        }
        if !drive_turn(&mut agent, &mut input).await {
            break;
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// What woke the turn loop up.
enum Step {
    Event(Option<AgentEvent>),
    Interrupt,
}

/// Pull agent events until the turn is over.
///
/// Returns `false` if stdin closed while a confirmation was pending.
async fn drive_turn(agent: &mut Agent, input: &mut mpsc::Receiver<String>) -> bool {
    let mut printed_content = false;

    loop {
        let step = tokio::select! {
            event = agent.next_event() => Step::Event(event),
            _ = tokio::signal::ctrl_c() => Step::Interrupt,
        };

        let event = match step {
            Step::Interrupt => {
                agent.cancel();
                continue;
            }
            Step::Event(Some(event)) => event,
            Step::Event(None) => {
                if agent.state() == AgentState::Idle {
                    end_line(&mut printed_content);
                    return true;
                }
                // Paused without an outstanding question; nothing will move it.
                tracing::warn!(state = %agent.state(), "Turn stalled");
                return true;
            }
        };

        match event {
            AgentEvent::StreamStart => {}
            AgentEvent::ContentChunk { content } => {
                if !printed_content {
                    print!("\n  AI > ");
                    printed_content = true;
                }
                print!("{content}");
                flush();
            }
            AgentEvent::StreamEnd => end_line(&mut printed_content),
            AgentEvent::ToolCallRequest { calls } => {
                end_line(&mut printed_content);
                for call in &calls {
                    println!("  [tool] {}", describe(call));
                }
            }
            AgentEvent::ConfirmationRequired { call } => {
                end_line(&mut printed_content);
                prompt(&format!("  Allow {}? [y/N] ", describe(&call)));
                let answer = tokio::select! {
                    line = input.recv() => line,
                    _ = tokio::signal::ctrl_c() => {
                        println!();
                        agent.cancel();
                        continue;
                    }
                };
                let Some(answer) = answer else {
                    agent.cancel();
                    return false;
                };
                if let Err(e) = agent.resolve_confirmation(is_approval(&answer)) {
                    eprintln!("  Error: {e}");
                }
            }
            AgentEvent::ToolResult { name, output, .. } => {
                println!("  [{name}] {}", preview(&output, RESULT_PREVIEW_LINES));
            }
            AgentEvent::Error { message } => {
                end_line(&mut printed_content);
                eprintln!("  Error: {message}");
            }
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                // EOF (Ctrl+D)
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}

fn is_exit_command(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

fn is_approval(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn describe(call: &ToolCall) -> String {
    format!("{}({})", call.name, call.arguments)
}

/// First `max_lines` lines of a tool output, with a count of what was cut.
fn preview(output: &str, max_lines: usize) -> String {
    let total = output.lines().count();
    let shown: Vec<&str> = output.lines().take(max_lines).collect();
    let mut text = shown.join("\n    ");
    if total > max_lines {
        text.push_str(&format!("\n    ... ({} more lines)", total - max_lines));
    }
    text
}

fn prompt(text: &str) {
    print!("{text}");
    flush();
}

fn end_line(printed_content: &mut bool) {
    if std::mem::take(printed_content) {
        println!();
    }
}

fn flush() {
    let _ = std::io::stdout().flush();
}
