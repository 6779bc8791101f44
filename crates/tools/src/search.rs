//! Content search tool: regex over every file under a directory.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};
use walkdir::WalkDir;

const NAME: &str = "search_file_content";

pub struct SearchFileContentTool;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    path: String,
    #[serde(default)]
    pattern: String,
}

#[async_trait]
impl Tool for SearchFileContentTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Recursively searches for a regular expression pattern in files within a directory. Usage: {\"path\": \"<directory_path>\", \"pattern\": \"<regex_pattern>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to start searching from."
                },
                "pattern": {
                    "type": "string",
                    "description": "The regular expression pattern to search for."
                }
            },
            "required": ["path", "pattern"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: SearchArgs = parse_arguments(NAME, arguments)?;
        if args.path.is_empty() || args.pattern.is_empty() {
            return Err(ToolError::invalid(NAME, "path and pattern arguments are required"));
        }

        let regex = Regex::new(&args.pattern)
            .map_err(|e| ToolError::failed(NAME, format!("invalid regex pattern: {e}")))?;

        let root = PathBuf::from(&args.path);
        tokio::task::spawn_blocking(move || search(&root, &regex))
            .await
            .map_err(|e| ToolError::failed(NAME, format!("search task failed: {e}")))?
    }
}

fn search(root: &Path, regex: &Regex) -> Result<String, ToolError> {
    let mut results = String::new();
    let mut matches = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ToolError::failed(NAME, format!("error walking directory '{}': {e}", root.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let content = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                let _ = writeln!(results, "Could not open file {}: {e}", path.display());
                continue;
            }
        };

        for (idx, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                matches += 1;
                let _ = writeln!(results, "{}:{}: {}", path.display(), idx + 1, line);
            }
        }
    }

    if matches == 0 {
        return Ok("No matches found.".into());
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_matches_with_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\nlet x = 1;\nfn helper() {}\n").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.rs"), "no functions here\n").unwrap();

        let args = serde_json::json!({ "path": dir.path(), "pattern": r"^fn \w+" }).to_string();
        let out = SearchFileContentTool.execute(&args).await.unwrap();

        let a = dir.path().join("a.rs");
        assert_eq!(
            out,
            format!(
                "{a}:1: fn main() {{}}\n{a}:3: fn helper() {{}}\n",
                a = a.display()
            )
        );
    }

    #[tokio::test]
    async fn no_matches_message() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "nothing\n").unwrap();
        let args = serde_json::json!({ "path": dir.path(), "pattern": "absent" }).to_string();
        let out = SearchFileContentTool.execute(&args).await.unwrap();
        assert_eq!(out, "No matches found.");
    }

    #[tokio::test]
    async fn invalid_regex_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = serde_json::json!({ "path": dir.path(), "pattern": "(unclosed" }).to_string();
        let err = SearchFileContentTool.execute(&args).await.unwrap_err();
        assert!(err.to_string().starts_with("invalid regex pattern"));
    }

    #[tokio::test]
    async fn missing_pattern_is_invalid() {
        let err = SearchFileContentTool.execute(r#"{"path":"."}"#).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
