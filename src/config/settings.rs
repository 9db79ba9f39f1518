//! Configuration settings management
//!
//! This module handles loading configuration from multiple sources,
//! validation, and persistence.

use crate::error::{BlobfetchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// How the credential chain is assembled.
///
/// `DeviceCode` is the default and always prompts; `Auto` tries ambient
/// credentials (environment, managed identity, Azure CLI) before falling
/// back to the device-code prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialMode {
    #[default]
    DeviceCode,
    Auto,
}

impl std::str::FromStr for CredentialMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "device-code" | "devicecode" | "device_code" => Ok(Self::DeviceCode),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "Unknown credential mode '{other}', expected 'device-code' or 'auto'"
            )),
        }
    }
}

impl std::fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceCode => write!(f, "device-code"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub tenant_id: String,
    pub client_id: String,
    pub storage_account: String,
    pub container_name: String,
    pub chunk_size_mb: usize,
    pub credential_mode: CredentialMode,
    pub output_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            tenant_id: String::new(),
            client_id: String::new(),
            storage_account: String::new(),
            container_name: String::new(),
            chunk_size_mb: 4,
            credential_mode: CredentialMode::default(),
            output_json: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.tenant_id.is_empty() {
            return Err(BlobfetchError::config(
                "Tenant ID is required. Set it with --tenant-id, AZURE_TENANT_ID, or 'bft config set tenant_id <id>'",
            ));
        }

        if self.client_id.is_empty() {
            return Err(BlobfetchError::config(
                "Client ID is required. Set it with --client-id, AZURE_CLIENT_ID, or 'bft config set client_id <id>'",
            ));
        }

        if self.storage_account.is_empty() {
            return Err(BlobfetchError::config(
                "Storage account is required. Set it with --storage-account or AZURE_STORAGE_ACCOUNT",
            ));
        }

        if self.container_name.is_empty() {
            return Err(BlobfetchError::config(
                "Container name is required. Set it with --container or AZURE_STORAGE_CONTAINER",
            ));
        }

        if self.chunk_size_mb == 0 {
            return Err(BlobfetchError::config("chunk_size_mb must be at least 1"));
        }

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        // Use XDG Base Directory specification on Linux and macOS
        // On Windows, use the platform-appropriate config directory
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| BlobfetchError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(config_dir.join("bft").join("bft.conf"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| BlobfetchError::config("Unable to determine config directory"))?;
            Ok(config_dir.join("bft").join("bft.conf"))
        }
    }

    pub async fn save(&self) -> Result<()> {
        save_config(self).await
    }

    /// The container URL the transfers will address.
    pub fn container_endpoint(&self) -> Result<Url> {
        let endpoint = format!(
            "https://{}.blob.core.windows.net/{}",
            self.storage_account, self.container_name
        );
        Url::parse(&endpoint)
            .map_err(|e| BlobfetchError::config(format!("Invalid container endpoint '{endpoint}': {e}")))
    }

    /// Chunk size in bytes for block staging and ranged reads.
    pub fn chunk_size_bytes(&self) -> u64 {
        (self.chunk_size_mb as u64) * 1024 * 1024
    }

    /// Set a configuration value by key name, as used by `bft config set`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tenant_id" => self.tenant_id = value.to_string(),
            "client_id" => self.client_id = value.to_string(),
            "storage_account" => self.storage_account = value.to_string(),
            "container_name" => self.container_name = value.to_string(),
            "chunk_size_mb" => {
                let parsed: usize = value.parse().map_err(|_| {
                    BlobfetchError::invalid_argument(format!(
                        "chunk_size_mb must be a positive integer, got '{value}'"
                    ))
                })?;
                if parsed == 0 {
                    return Err(BlobfetchError::invalid_argument(
                        "chunk_size_mb must be at least 1",
                    ));
                }
                self.chunk_size_mb = parsed;
            }
            "credential_mode" => {
                self.credential_mode = value
                    .parse()
                    .map_err(BlobfetchError::invalid_argument)?;
            }
            "debug" => self.debug = value.to_lowercase() == "true" || value == "1",
            "output_json" => self.output_json = value.to_lowercase() == "true" || value == "1",
            other => {
                return Err(BlobfetchError::invalid_argument(format!(
                    "Unknown configuration key '{other}'"
                )));
            }
        }
        Ok(())
    }
}

/// Load configuration from multiple sources with priority order:
/// 1. Command-line flags (handled by clap)
/// 2. Environment variables
/// 3. Configuration file
/// 4. Default values
///
/// Validation is deferred: config commands must work on an empty file, and
/// transfer commands may still receive required values as CLI flags.
pub async fn load_config_no_validation() -> Result<Config> {
    let mut config = Config::default();

    // Load from configuration file if it exists
    let config_path = Config::get_config_path()?;
    if config_path.exists() {
        config = load_from_file(&config_path).await?;
    }

    // Override with environment variables
    load_from_env(&mut config);

    Ok(config)
}

async fn load_from_file(path: &PathBuf) -> Result<Config> {
    let contents = tokio::fs::read_to_string(path).await?;

    // Try to parse as TOML first, then JSON as fallback
    if let Ok(config) = toml::from_str::<Config>(&contents) {
        return Ok(config);
    }

    let config = serde_json::from_str::<Config>(&contents)?;
    Ok(config)
}

fn load_from_env(config: &mut Config) {
    if let Ok(value) = std::env::var("DEBUG") {
        config.debug = value.to_lowercase() == "true" || value == "1";
    }

    if let Ok(value) = std::env::var("AZURE_TENANT_ID") {
        config.tenant_id = value;
    }

    if let Ok(value) = std::env::var("AZURE_CLIENT_ID") {
        config.client_id = value;
    }

    if let Ok(value) = std::env::var("AZURE_STORAGE_ACCOUNT") {
        config.storage_account = value;
    }

    if let Ok(value) = std::env::var("AZURE_STORAGE_CONTAINER") {
        config.container_name = value;
    }

    if let Ok(value) = std::env::var("BLOBFETCH_CHUNK_SIZE_MB") {
        if let Ok(chunk_size) = value.parse::<usize>() {
            config.chunk_size_mb = chunk_size;
        }
    }

    if let Ok(value) = std::env::var("BLOBFETCH_CREDENTIAL") {
        if let Ok(mode) = value.parse::<CredentialMode>() {
            config.credential_mode = mode;
        }
    }
}

pub async fn save_config(config: &Config) -> Result<()> {
    let config_path = Config::get_config_path()?;

    // Create parent directories if they don't exist
    if let Some(parent) = config_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Serialize to TOML format
    let contents = toml::to_string_pretty(config)
        .map_err(|e| BlobfetchError::serialization(e.to_string()))?;

    tokio::fs::write(&config_path, contents).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunk_size_mb, 4);
        assert_eq!(config.credential_mode, CredentialMode::DeviceCode);
        assert!(!config.debug);
        assert!(config.tenant_id.is_empty());
    }

    #[test]
    fn test_validate_requires_connection_parameters() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.tenant_id = "12345678-1234-1234-1234-123456789012".to_string();
        config.client_id = "87654321-4321-4321-4321-210987654321".to_string();
        config.storage_account = "mystorageaccount".to_string();
        assert!(config.validate().is_err());

        config.container_name = "assets".to_string();
        assert!(config.validate().is_ok());

        config.chunk_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_container_endpoint() {
        let config = Config {
            storage_account: "mystorageaccount".to_string(),
            container_name: "assets".to_string(),
            ..Config::default()
        };
        let endpoint = config.container_endpoint().unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://mystorageaccount.blob.core.windows.net/assets"
        );
    }

    #[test]
    fn test_chunk_size_bytes() {
        let config = Config::default();
        assert_eq!(config.chunk_size_bytes(), 4 * 1024 * 1024);
    }

    #[test]
    fn test_credential_mode_parsing() {
        assert_eq!(
            "device-code".parse::<CredentialMode>().unwrap(),
            CredentialMode::DeviceCode
        );
        assert_eq!("auto".parse::<CredentialMode>().unwrap(), CredentialMode::Auto);
        assert!("browser".parse::<CredentialMode>().is_err());
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("storage_account", "acct").unwrap();
        config.set_value("container_name", "files").unwrap();
        config.set_value("chunk_size_mb", "8").unwrap();
        config.set_value("credential_mode", "auto").unwrap();
        config.set_value("debug", "true").unwrap();

        assert_eq!(config.storage_account, "acct");
        assert_eq!(config.container_name, "files");
        assert_eq!(config.chunk_size_mb, 8);
        assert_eq!(config.credential_mode, CredentialMode::Auto);
        assert!(config.debug);

        assert!(config.set_value("chunk_size_mb", "lots").is_err());
        assert!(config.set_value("chunk_size_mb", "0").is_err());
        assert_eq!(config.chunk_size_mb, 8);
        assert!(config.set_value("no_such_key", "x").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.tenant_id = "tenant".to_string();
        config.credential_mode = CredentialMode::Auto;

        let toml_text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed.tenant_id, "tenant");
        assert_eq!(parsed.credential_mode, CredentialMode::Auto);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: Config = toml::from_str("storage_account = \"acct\"").unwrap();
        assert_eq!(parsed.storage_account, "acct");
        assert_eq!(parsed.chunk_size_mb, 4);
        assert_eq!(parsed.credential_mode, CredentialMode::DeviceCode);
    }
}
