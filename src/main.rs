use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use versechat::backend::{ChatBackend, HttpBackend};
use versechat::config::{API_URL_ENV, Config};
use versechat::controller::ConversationController;
use versechat::logging::{self, LogTarget};
use versechat::{commands, ui};

#[derive(Parser)]
#[command(name = "versechat")]
#[command(version)]
#[command(about = "Chat with an AI guide to a poetry collection", long_about = None)]
struct Cli {
    /// Base address of the chat backend
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to the config file (default: ~/.versechat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask { question: Vec<String> },
    /// Show the effective configuration
    Config,
}

fn build_controller(config: &Config) -> Result<ConversationController> {
    let backend: Option<Arc<dyn ChatBackend>> = match config.api_url.as_deref() {
        Some(url) => {
            let backend = HttpBackend::new(url, config.request_timeout())
                .context("Failed to create HTTP client")?;
            info!(endpoint = backend.endpoint(), "chat backend configured");
            Some(Arc::new(backend))
        }
        None => {
            warn!("no backend URL configured");
            None
        }
    };
    Ok(ConversationController::new(backend))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if cli.command.is_none() {
        let log_dir = Config::home_dir()?.join("logs");
        logging::init(LogTarget::File(&log_dir), cli.verbose)?;
    } else {
        logging::init(LogTarget::Stderr, cli.verbose)?;
    }

    let mut config = Config::load(&config_path)?;
    let source = config.resolve_api_url(cli.api_url, std::env::var(API_URL_ENV).ok());

    match cli.command {
        None => {
            let controller = build_controller(&config)?;
            ui::run(controller, config.ui.clone()).await
        }
        Some(Commands::Ask { question }) => {
            let controller = build_controller(&config)?;
            let answered = commands::ask(controller, &question.join(" ")).await?;
            if !answered {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Config) => commands::show_config(&config, source, &config_path),
    }
}
