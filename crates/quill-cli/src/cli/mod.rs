//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use quill_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "quill")]
#[command(version = "0.1")]
#[command(about = "Terminal client for the quill blogging service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the service base URL for this run
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Set the service base URL
    SetUrl {
        /// Base URL of the blogging service, e.g. http://127.0.0.1:8000
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }

    let Some(command) = cli.command else {
        // default to the interactive client
        let _guard = quill_core::logging::init().context("init logging")?;
        tracing::info!(base_url = %config.base_url, "starting quill");
        return quill_tui::run(&config).await;
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}
