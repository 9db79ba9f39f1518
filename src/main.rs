//! blobfetch - Azure Blob Storage transfer tool
//!
//! A command-line tool for moving single blobs between Azure Blob Storage
//! and the local filesystem, written in Rust for performance, safety, and
//! reliability.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod blob;
mod cli;
mod config;
mod error;
mod utils;

use crate::cli::Cli;
use crate::error::Result;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the command
    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load without validation: required connection parameters may still
    // arrive as CLI flags, and config commands must work on an empty file.
    // Transfer commands validate once overrides are applied.
    let config = config::load_config_no_validation().await?;

    // Logging is initialized after the config load so the persisted debug
    // setting can raise the default verbosity.
    init_logging(config.debug);
    info!("Starting blobfetch");

    cli.execute(config).await?;

    Ok(())
}

/// RUST_LOG always wins; the debug config setting only raises the default.
fn default_log_filter(debug: bool) -> &'static str {
    if debug {
        "blobfetch=debug"
    } else {
        "blobfetch=info"
    }
}

fn init_logging(debug: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter(debug).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_setting_raises_default_log_filter() {
        assert_eq!(default_log_filter(false), "blobfetch=info");
        assert_eq!(default_log_filter(true), "blobfetch=debug");
    }
}
