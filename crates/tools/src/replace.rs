//! Replace tool: edit a file in place by swapping the first occurrence of a string.

use async_trait::async_trait;
use serde::Deserialize;
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};

pub struct ReplaceTool;

#[derive(Debug, Deserialize)]
struct ReplaceArgs {
    #[serde(default)]
    path: String,
    #[serde(default)]
    old_string: String,
    #[serde(default)]
    new_string: String,
}

#[async_trait]
impl Tool for ReplaceTool {
    fn name(&self) -> &str {
        "replace"
    }

    fn description(&self) -> &str {
        "Replaces the first occurrence of a specified old string with a new string in a file. Usage: {\"path\": \"<file_path>\", \"old_string\": \"<string_to_find>\", \"new_string\": \"<string_to_replace_with>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file to modify."
                },
                "old_string": {
                    "type": "string",
                    "description": "The string to find in the file."
                },
                "new_string": {
                    "type": "string",
                    "description": "The string to replace the old string with."
                }
            },
            "required": ["path", "old_string", "new_string"]
        })
    }

    fn requires_confirmation(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ReplaceArgs = parse_arguments(self.name(), arguments)?;
        if args.path.is_empty() || args.old_string.is_empty() {
            return Err(ToolError::invalid(
                self.name(),
                "path and old_string arguments are required",
            ));
        }

        let content = tokio::fs::read_to_string(&args.path).await.map_err(|e| {
            ToolError::failed(self.name(), format!("error reading file '{}': {e}", args.path))
        })?;

        if !content.contains(&args.old_string) {
            return Err(ToolError::failed(
                self.name(),
                format!("old_string not found in file '{}'", args.path),
            ));
        }
        let modified = content.replacen(&args.old_string, &args.new_string, 1);

        tokio::fs::write(&args.path, modified).await.map_err(|e| {
            ToolError::failed(self.name(), format!("error writing to file '{}': {e}", args.path))
        })?;

        Ok(format!(
            "Successfully replaced first occurrence of string in {}",
            args.path
        ))
    }
}
