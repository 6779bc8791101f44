//! Tachigoma CLI, the main entry point.
//!
//! Modes:
//! - `tachigoma -p "<prompt>"` or `tachigoma <words...>`: one-shot answer
//! - `tachigoma`: interactive session with tools
//! - `tachigoma --init`: write a starter `.tachigoma.toml`

use clap::Parser;
use std::path::PathBuf;
use tachigoma_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "tachigoma",
    about = "Tachigoma: talk to a language model that can use your terminal",
    version
)]
struct Cli {
    /// Send a single prompt instead of entering interactive mode
    #[arg(short, long)]
    prompt: Option<String>,

    /// Prompt words, joined with spaces (same as --prompt)
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,

    /// Override the model name
    #[arg(long)]
    model: Option<String>,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Read configuration from this file instead of the default locations
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a default .tachigoma.toml in the current directory and exit
    #[arg(long)]
    init: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl Cli {
    /// The one-shot prompt, if any was given.
    fn one_shot_prompt(&self) -> Option<String> {
        match &self.prompt {
            Some(p) => Some(p.clone()),
            None if !self.args.is_empty() => Some(self.args.join(" ")),
            None => None,
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load()?,
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with model output
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.init {
        return commands::init::run();
    }

    let config = load_config(&cli)?;
    if !config.has_api_key() {
        tracing::warn!("No API key configured; requests are sent without authorization");
    }

    match cli.one_shot_prompt() {
        Some(prompt) => {
            if let Err(e) = commands::ask::run(&config, &prompt).await {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        None => commands::chat::run(&config).await?,
    }

    Ok(())
}
