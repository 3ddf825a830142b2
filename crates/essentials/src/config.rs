//! Configuration management for the essentials server.
//!
//! Handles loading, validation and conversion of the TOML configuration file.
//! Every field has a serde default, so a partial file is completed with the
//! stock values.

use anyhow::Context;
use game_server::ServerConfig;
use permission::PermissionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the permission lists
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Game server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Permission list file names
    #[serde(default)]
    pub permissions: PermissionSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server: ServerConfig::default(),
            permissions: PermissionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if tokio::fs::try_exists(path).await? {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let config =
                toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
            return Ok(config);
        }

        let default_config = AppConfig::default();
        let toml_content = toml::to_string_pretty(&default_config)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, toml_content)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Created default configuration file: {}", path.display());
        Ok(default_config)
    }

    /// Settings handed to the game server core.
    pub fn to_server_config(&self) -> ServerConfig {
        self.server.clone()
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Returns an error string describing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.trim().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }

        if self.server.name.trim().is_empty() {
            return Err("Server name cannot be empty".to_string());
        }
        if self.server.max_players == 0 {
            return Err("max_players must be at least 1".to_string());
        }

        if self.permissions.operators_file.trim().is_empty()
            || self.permissions.bans_file.trim().is_empty()
        {
            return Err("Permission list file names cannot be empty".to_string());
        }
        if self.permissions.operators_file == self.permissions.bans_file {
            return Err(format!(
                "Operator and ban lists must use different files, both are {}",
                self.permissions.bans_file
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {VALID_LOG_LEVELS:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
