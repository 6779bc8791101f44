//! File read tool: return the full contents of a file.

use async_trait::async_trait;
use serde::Deserialize;
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};

pub struct FileReadTool;

#[derive(Debug, Deserialize)]
struct FileReadArgs {
    #[serde(default)]
    path: String,
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads the entire content of a specified file. Usage: {\"path\": \"<file_path>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file to read."
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: FileReadArgs = parse_arguments(self.name(), arguments)?;
        if args.path.is_empty() {
            return Err(ToolError::invalid(self.name(), "path argument is required"));
        }

        let bytes = tokio::fs::read(&args.path).await.map_err(|e| {
            ToolError::failed(self.name(), format!("error reading file '{}': {e}", args.path))
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
