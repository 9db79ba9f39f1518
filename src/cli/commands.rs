//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, subcommands, and their arguments.

use crate::blob::models::{DownloadRequest, UploadRequest};
use crate::blob::transfer::create_blob_transfer;
use crate::config::{Config, CredentialMode};
use crate::error::{BlobfetchError, Result};
use crate::utils::format::{format_size, format_timestamp};
use crate::utils::progress::TransferProgress;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Get the full version string with build information
fn get_version() -> &'static str {
    env!("VERSION_WITH_GIT")
}

#[derive(Parser)]
#[command(name = "bft")]
#[command(about = "Transfer blobs to and from Azure Blob Storage")]
#[command(version = get_version(), author)]
pub struct Cli {
    /// Storage account name (overrides config and environment)
    #[arg(long, global = true)]
    pub storage_account: Option<String>,

    /// Container name (overrides config and environment)
    #[arg(long, global = true)]
    pub container: Option<String>,

    /// Azure AD tenant ID (overrides config and environment)
    #[arg(long, global = true)]
    pub tenant_id: Option<String>,

    /// Azure AD application (client) ID (overrides config and environment)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Credential chain to use for authentication
    #[arg(long, global = true, value_enum)]
    pub credential: Option<CredentialMode>,

    /// Emit JSON instead of text where applicable
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress the progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a blob to a local file
    #[command(alias = "down")]
    Download {
        /// Blob name to download
        name: String,
        /// Local output path (defaults to the blob name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite the output file without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Upload a local file as a block blob
    #[command(alias = "up")]
    Upload {
        /// Local file path to upload
        file_path: PathBuf,
        /// Remote blob name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
        /// Content type override
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Show blob properties
    Info {
        /// Blob name
        name: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Setting name
        key: String,
        /// Setting value
        value: String,
    },
    /// Show configuration file path
    Path,
}

impl Cli {
    pub async fn execute(self, mut config: Config) -> Result<()> {
        // CLI flags override config/env
        if let Some(account) = self.storage_account {
            config.storage_account = account;
        }
        if let Some(container) = self.container {
            config.container_name = container;
        }
        if let Some(tenant_id) = self.tenant_id {
            config.tenant_id = tenant_id;
        }
        if let Some(client_id) = self.client_id {
            config.client_id = client_id;
        }
        if let Some(mode) = self.credential {
            config.credential_mode = mode;
        }
        if self.json {
            config.output_json = true;
        }

        match self.command {
            Commands::Download {
                name,
                output,
                force,
            } => execute_download(&name, output, force, self.quiet, &config).await,
            Commands::Upload {
                file_path,
                name,
                content_type,
            } => execute_upload(&file_path, name, content_type, self.quiet, &config).await,
            Commands::Info { name } => execute_info(&name, self.quiet, &config).await,
            Commands::Config { command } => execute_config_command(command, config).await,
        }
    }
}

async fn execute_download(
    name: &str,
    output: Option<PathBuf>,
    force: bool,
    quiet: bool,
    config: &Config,
) -> Result<()> {
    let output_path = output.unwrap_or_else(|| PathBuf::from(name));

    if output_path.exists() && !force && !confirm_overwrite(&output_path, quiet)? {
        println!("Download cancelled.");
        return Ok(());
    }

    let transfer = create_blob_transfer(config)?;

    // The blob size drives the progress bar length, so fetch properties
    // before streaming.
    let info = transfer.properties(name).await?;
    let progress = TransferProgress::bytes(info.size, format!("Downloading {name}"), quiet);

    let request = DownloadRequest {
        blob_name: name.to_string(),
        output_path: output_path.clone(),
    };
    let written = transfer.download_to_file(&request, &progress).await?;

    println!(
        "✅ Downloaded '{}' to '{}' ({})",
        name,
        output_path.display(),
        format_size(written)
    );

    Ok(())
}

async fn execute_upload(
    file_path: &Path,
    name: Option<String>,
    content_type: Option<String>,
    quiet: bool,
    config: &Config,
) -> Result<()> {
    if !file_path.exists() {
        return Err(BlobfetchError::invalid_argument(format!(
            "File not found: {}",
            file_path.display()
        )));
    }

    let blob_name = match name {
        Some(name) => name,
        None => file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                BlobfetchError::invalid_argument(format!(
                    "Cannot derive a blob name from '{}'",
                    file_path.display()
                ))
            })?,
    };

    let size = tokio::fs::metadata(file_path).await?.len();
    let transfer = create_blob_transfer(config)?;
    let progress = TransferProgress::bytes(size, format!("Uploading to {blob_name}"), quiet);

    let request = UploadRequest {
        file_path: file_path.to_path_buf(),
        blob_name: blob_name.clone(),
        content_type,
    };
    let info = transfer.upload_file(&request, &progress).await?;

    println!("✅ Uploaded '{}' as '{}'", file_path.display(), info.name);
    println!("   Size: {}", format_size(info.size));
    println!("   Content-Type: {}", info.content_type);
    println!("   ETag: {}", info.etag);

    Ok(())
}

async fn execute_info(name: &str, quiet: bool, config: &Config) -> Result<()> {
    let transfer = create_blob_transfer(config)?;

    let spinner = TransferProgress::spinner(format!("Fetching properties of {name}"), quiet);
    let info = transfer.properties(name).await;
    spinner.finish();
    let info = info?;

    if config.output_json {
        let json_output = serde_json::to_string_pretty(&info).map_err(|e| {
            BlobfetchError::serialization(format!("Failed to serialize blob info: {e}"))
        })?;
        println!("{json_output}");
    } else {
        println!("Blob Information:");
        println!("  Name: {}", info.name);
        println!("  Size: {} ({} bytes)", format_size(info.size), info.size);
        println!("  Content-Type: {}", info.content_type);
        println!("  Last Modified: {}", format_timestamp(&info.last_modified));
        println!("  ETag: {}", info.etag);
    }

    Ok(())
}

async fn execute_config_command(command: ConfigCommands, mut config: Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            if config.output_json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let contents = toml::to_string_pretty(&config)
                    .map_err(|e| BlobfetchError::serialization(e.to_string()))?;
                print!("{contents}");
            }
        }
        ConfigCommands::Set { key, value } => {
            config.set_value(&key, &value)?;
            config.save().await?;
            println!("✅ Set {key}");
        }
        ConfigCommands::Path => {
            println!("{}", Config::get_config_path()?.display());
        }
    }
    Ok(())
}

fn confirm_overwrite(path: &Path, quiet: bool) -> Result<bool> {
    if quiet {
        // No prompting in quiet mode; require --force instead.
        return Err(BlobfetchError::invalid_argument(format!(
            "File '{}' already exists. Use --force to overwrite.",
            path.display()
        )));
    }

    dialoguer::Confirm::new()
        .with_prompt(format!("File '{}' already exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .map_err(|e| BlobfetchError::config(format!("Failed to get user input: {e}")))
}
