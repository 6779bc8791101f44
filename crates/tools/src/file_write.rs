//! File write tool: create or overwrite a file.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};
use tracing::debug;

pub struct FileWriteTool;

#[derive(Debug, Deserialize)]
struct FileWriteArgs {
    #[serde(default)]
    path: String,
    content: String,
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a specified file, creating the file if it doesn't exist or overwriting it if it does. Usage: {\"path\": \"<file_path>\", \"content\": \"<content_to_write>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file to write to."
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file."
                }
            },
            "required": ["path", "content"]
        })
    }

    fn requires_confirmation(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: FileWriteArgs = parse_arguments(self.name(), arguments)?;
        if args.path.is_empty() {
            return Err(ToolError::invalid(self.name(), "path argument is required"));
        }

        if let Some(parent) = Path::new(&args.path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::failed(self.name(), format!("error creating directory '{}': {e}", parent.display()))
            })?;
        }

        tokio::fs::write(&args.path, args.content.as_bytes())
            .await
            .map_err(|e| {
                ToolError::failed(self.name(), format!("error writing to file '{}': {e}", args.path))
            })?;

        debug!(path = %args.path, bytes = args.content.len(), "Wrote file");
        Ok(format!(
            "Successfully wrote {} bytes to {}",
            args.content.len(),
            args.path
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/dir/out.txt");
        let args = serde_json::json!({ "path": file, "content": "hello" }).to_string();

        let out = FileWriteTool.execute(&args).await.unwrap();
        assert_eq!(out, format!("Successfully wrote 5 bytes to {}", file.display()));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello");
    }

    #[tokio::test]
    async fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.txt");
        std::fs::write(&file, "old content that is long").unwrap();

        let args = serde_json::json!({ "path": file, "content": "new" }).to_string();
        FileWriteTool.execute(&args).await.unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "new");
    }

    #[tokio::test]
    async fn missing_content_is_invalid() {
        let err = FileWriteTool.execute(r#"{"path":"x.txt"}"#).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn requires_confirmation() {
        assert!(FileWriteTool.requires_confirmation());
    }
}
