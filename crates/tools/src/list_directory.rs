//! Directory listing tool.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs::Metadata;
use tachigoma_core::error::ToolError;
use tachigoma_core::tool::{Tool, parse_arguments};

pub struct ListDirectoryTool;

#[derive(Debug, Deserialize)]
struct ListDirectoryArgs {
    #[serde(default)]
    path: String,
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "Lists files and subdirectories within a specified directory path. Usage: {\"path\": \"<directory_path>\"}"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the directory to list."
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ListDirectoryArgs = parse_arguments(self.name(), arguments)?;
        let path = if args.path.is_empty() { "." } else { args.path.as_str() };

        let mut dir = tokio::fs::read_dir(path).await.map_err(|e| {
            ToolError::failed(self.name(), format!("error reading directory '{path}': {e}"))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            ToolError::failed(self.name(), format!("error reading directory '{path}': {e}"))
        })? {
            // Entries whose metadata cannot be read are left out.
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if meta.is_dir() {
                name.push('/');
            }
            entries.push((name, meta));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut output = format!("Contents of {path}:\n");
        for (name, meta) in &entries {
            let modified = meta
                .modified()
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|_| "-".repeat(19));
            let _ = writeln!(
                output,
                "{:<12} {:<10} {} {}",
                mode_string(meta),
                meta.len(),
                modified,
                name
            );
        }
        Ok(output)
    }
}

/// `ls`-style permission string, e.g. `drwxr-xr-x`.
#[cfg(unix)]
fn mode_string(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut s = String::with_capacity(10);
    s.push(if meta.is_dir() {
        'd'
    } else if meta.file_type().is_symlink() {
        'L'
    } else {
        '-'
    });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}

#[cfg(not(unix))]
fn mode_string(meta: &Metadata) -> String {
    let kind = if meta.is_dir() { 'd' } else { '-' };
    let perms = if meta.permissions().readonly() {
        "r--r--r--"
    } else {
        "rw-rw-rw-"
    };
    format!("{kind}{perms}")
}
