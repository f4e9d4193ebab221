use crate::config::{load_config, DispatchMode};
use crate::record::Severity;
use crate::registry::Registry;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Top-level CLI interface for logdumper
#[derive(Parser, Debug)]
#[command(
    name = "logdumper",
    version,
    about = "Append INFO/ERROR lines to an application's log file"
)]
pub struct Cli {
    /// Configuration file (defaults to ./logdumper.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured log directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Write lines in call order through a single writer
    #[arg(long)]
    pub ordered: bool,

    /// Application name to register
    #[arg(short, long)]
    pub app: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log each message at INFO
    Info {
        #[arg(required = true)]
        messages: Vec<String>,
    },

    /// Log each message at ERROR
    Error {
        #[arg(required = true)]
        messages: Vec<String>,
    },
}

impl Commands {
    fn split(&self) -> (Severity, &[String]) {
        match self {
            Commands::Info { messages } => (Severity::Info, messages.as_slice()),
            Commands::Error { messages } => (Severity::Error, messages.as_slice()),
        }
    }
}

/// Register, submit every message, and wait for the writes to finish.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.dir {
        config.log_directory = dir;
    }
    if cli.ordered {
        config.dispatch = DispatchMode::Ordered;
    }

    let registry = Registry::new(config)?;
    let logger = match registry.register_app(&cli.app) {
        Ok(logger) => logger,
        Err(e) => bail!("registration failed: {e}"),
    };

    let (severity, messages) = cli.command.split();
    for message in messages {
        logger.submit(severity, message.as_str());
    }
    logger.flush().await;

    info!(
        app = %cli.app,
        count = messages.len(),
        path = %logger.handle().file_path().display(),
        "messages submitted"
    );
    Ok(())
}
