//! Built-in tool implementations for Tachigoma.
//!
//! Tools give the model the ability to act on the local machine:
//! list, read, write and edit files, search their contents, glob for
//! paths, and run shell commands.
//!
//! Anything that mutates files or runs external commands requires the user
//! to confirm each call.

pub mod file_read;
pub mod file_write;
pub mod glob;
pub mod list_directory;
pub mod replace;
pub mod search;
pub mod shell;

use std::sync::Arc;
use tachigoma_core::tool::{Tool, ToolRegistry};
use tracing::debug;

pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use glob::GlobTool;
pub use list_directory::ListDirectoryTool;
pub use replace::ReplaceTool;
pub use search::SearchFileContentTool;
pub use shell::ShellTool;

/// Every built-in tool, in registration order.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListDirectoryTool),
        Arc::new(FileReadTool),
        Arc::new(FileWriteTool),
        Arc::new(SearchFileContentTool),
        Arc::new(GlobTool),
        Arc::new(ReplaceTool),
        Arc::new(ShellTool),
    ]
}

/// Create a registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    ToolRegistry::from_tools(builtin_tools())
}

/// Create a registry with the built-ins minus the named ones.
pub fn registry_with(disabled: &[String]) -> ToolRegistry {
    let registry = ToolRegistry::from_tools(
        builtin_tools()
            .into_iter()
            .filter(|t| !disabled.iter().any(|d| d == t.name())),
    );
    debug!(tools = ?registry.names(), "Built tool registry");
    registry
}
