//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::accounts::AccountBlock;
use super::defaults::{default_accounts, default_server_name, default_storage_root};
use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Where received files are stored.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Credential table. Falls back to the three demo accounts when absent.
    #[serde(default = "default_accounts", rename = "account")]
    pub accounts: Vec<AccountBlock>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            listen: ListenConfig::default(),
            storage: StorageConfig::default(),
            limits: LimitsConfig::default(),
            accounts: default_accounts(),
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs (e.g., "courier.local").
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

/// Received-file storage configuration.
///
/// Files land at `<root>/<username>/<file name>`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for per-user subdirectories (default: "received_files").
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Maximum size of a single received file in bytes; 0 disables the limit.
    #[serde(default)]
    pub max_file_bytes: u64,
}

impl StorageConfig {
    /// Size limit as an option (`None` = unlimited).
    pub fn size_limit(&self) -> Option<u64> {
        (self.max_file_bytes > 0).then_some(self.max_file_bytes)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_file_bytes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.name, "courier.local");
        assert_eq!(config.listen.address.port(), 8080);
        assert!(config.listen.udp_address.is_none());
        assert_eq!(config.storage.root, PathBuf::from("received_files"));
        assert_eq!(config.storage.size_limit(), None);
        assert_eq!(config.accounts.len(), 3);
    }

    #[test]
    fn full_file_parses() {
        let config = Config::parse(
            r#"
[server]
name = "test.courier"

[listen]
address = "127.0.0.1:9000"
udp_address = "127.0.0.1:9001"

[storage]
root = "/tmp/courier"
max_file_bytes = 1048576

[limits]
max_line_len = 512
idle_timeout = 30

[[account]]
name = "alice"
password = "wonderland"
"#,
        )
        .unwrap();

        assert_eq!(config.server.name, "test.courier");
        assert_eq!(config.listen.address.port(), 9000);
        assert_eq!(config.listen.udp_address.map(|a| a.port()), Some(9001));
        assert_eq!(config.storage.size_limit(), Some(1_048_576));
        assert_eq!(config.limits.max_line_len, 512);
        assert_eq!(config.limits.idle_timeout(), Some(std::time::Duration::from_secs(30)));
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].name, "alice");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let result = Config::parse("[listen]\naddress = 12");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
