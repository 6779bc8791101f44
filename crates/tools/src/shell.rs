//! Shell tool: execute a command through the platform shell.
//!
//! Returns stdout and stderr combined. A non-zero exit status is reported as
//! an execution failure that still carries the command's output, since that
//! is usually where the explanation is.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};
use tokio::process::Command;
use tracing::{debug, warn};

pub struct ShellTool;

#[derive(Debug, Deserialize)]
struct ShellArgs {
    #[serde(default)]
    command: String,
    #[serde(default)]
    directory: Option<String>,
}

impl ShellTool {
    fn command_for(line: &str) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", line]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", line]);
            c
        };
        // Dropping the future (turn cancelled) must not leave the child running.
        cmd.kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "run_shell_command"
    }

    fn description(&self) -> &str {
        "Executes a shell command on the user's operating system and returns the combined output from stdout and stderr. \
This tool is powerful and can modify system state. \
Usage: {\"command\": \"<command_to_run>\", \"directory\": \"<optional_path>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute."
                },
                "directory": {
                    "type": "string",
                    "description": "Optional: The working directory where the command should be executed. If not provided, it uses the current directory of the application."
                }
            },
            "required": ["command"]
        })
    }

    fn requires_confirmation(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ShellArgs = parse_arguments(self.name(), arguments)?;
        if args.command.trim().is_empty() {
            return Err(ToolError::invalid(self.name(), "command argument cannot be empty"));
        }

        let mut cmd = Self::command_for(&args.command);
        if let Some(dir) = args.directory.as_deref().filter(|d| !d.is_empty()) {
            cmd.current_dir(dir);
        }

        debug!(command = %args.command, directory = ?args.directory, "Executing shell command");

        let output = cmd
            .output()
            .await
            .map_err(|e| ToolError::failed(self.name(), format!("failed to start command: {e}")))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            return Ok(combined);
        }

        let status = match output.status.code() {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        warn!(command = %args.command, %status, "Command failed");
        Err(ToolError::failed(
            self.name(),
            format!("command failed with {status}\nOutput:\n{combined}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let out = ShellTool
            .execute(r#"{"command":"echo hello"}"#)
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn combines_stdout_and_stderr() {
        let out = ShellTool
            .execute(r#"{"command":"echo out; echo err 1>&2"}"#)
            .await
            .unwrap();
        assert!(out.contains("out"));
        assert!(out.contains("err"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let args = serde_json::json!({ "command": "ls", "directory": dir.path() }).to_string();
        let out = ShellTool.execute(&args).await.unwrap();
        assert!(out.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_error_with_output() {
        let err = ShellTool
            .execute(r#"{"command":"echo boom; exit 3"}"#)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("command failed with exit status 3"));
        assert!(msg.contains("boom"));
    }

    #[tokio::test]
    async fn empty_command_is_invalid() {
        let err = ShellTool.execute(r#"{"command":"  "}"#).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn requires_confirmation() {
        assert!(ShellTool.requires_confirmation());
    }
}
