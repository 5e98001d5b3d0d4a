//! # keyedit
//!
//! Drives gpg's interactive key editor and colon-format key listings from
//! the command line, printing results as JSON.

use clap::Parser;
use keyedit::{commands, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("keyedit v{} starting", env!("CARGO_PKG_VERSION"));

    let output = commands::run(&cli, config).await.map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
