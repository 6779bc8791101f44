//! Glob tool: find files whose path matches a pattern.

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};
use walkdir::WalkDir;

const NAME: &str = "glob";

pub struct GlobTool;

#[derive(Debug, Deserialize)]
struct GlobArgs {
    #[serde(default)]
    pattern: String,
    #[serde(default)]
    path: String,
}

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Finds files and directories matching a specified glob pattern within a given path. Usage: {\"pattern\": \"<glob_pattern>\", \"path\": \"<base_directory>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The glob pattern to match files against (e.g., \"src/**/*.rs\")."
                },
                "path": {
                    "type": "string",
                    "description": "Optional: The base directory to start the glob search from. Defaults to the current working directory if not provided."
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: GlobArgs = parse_arguments(NAME, arguments)?;
        if args.pattern.is_empty() {
            return Err(ToolError::invalid(NAME, "pattern argument is required"));
        }

        // `*` stays within one path component; `**` crosses directories.
        let matcher = GlobBuilder::new(&args.pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                ToolError::failed(NAME, format!("invalid glob pattern {}: {e}", args.pattern))
            })?
            .compile_matcher();

        let base = PathBuf::from(if args.path.is_empty() { "." } else { args.path.as_str() });
        let matches = tokio::task::spawn_blocking(move || find_matches(&base, &matcher))
            .await
            .map_err(|e| ToolError::failed(NAME, format!("glob task failed: {e}")))??;

        if matches.is_empty() {
            return Ok("No files matched the pattern.".into());
        }
        Ok(matches.join("\n"))
    }
}

fn find_matches(base: &Path, matcher: &GlobMatcher) -> Result<Vec<String>, ToolError> {
    let mut matches = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ToolError::failed(NAME, format!("error walking directory '{}': {e}", base.display()))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        if matcher.is_match(relative) {
            let shown = if base == Path::new(".") {
                relative
            } else {
                entry.path()
            };
            matches.push(shown.display().to_string());
        }
    }
    Ok(matches)
}
