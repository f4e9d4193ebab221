// logdumper - main.rs
// Installs the diagnostic subscriber and runs the CLI

use clap::Parser;
use logdumper::cli::{run, Cli};
use std::process::exit;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("logdumper: {e:#}");
        exit(1);
    }
}
