//! `tachigoma --init`: write a starter config file.

use std::path::{Path, PathBuf};
use tachigoma_config::{AppConfig, CONFIG_FILE_NAME};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::current_dir()?;
    match write_default(&dir)? {
        Some(path) => println!("Created {}", path.display()),
        None => println!("  {CONFIG_FILE_NAME} already exists, left unchanged"),
    }
    println!("  Set api_key there or export TACHIGOMA_API_KEY.");
    Ok(())
}

/// Write the default config into `dir`. Returns `None` if a file is
/// already there.
pub fn write_default(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Ok(None);
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    Ok(Some(path))
}
