//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/truckmate/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/truckmate/` (~/.config/truckmate/)
//! - Data: `$XDG_DATA_HOME/truckmate/` (~/.local/share/truckmate/)
//! - State/Logs: `$XDG_STATE_HOME/truckmate/` (~/.local/state/truckmate/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "TRUCKMATE_API_BASE_URL";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session persistence
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds (unset: HTTP stack defaults)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api.base_url must start with http:// or https:// (got {url})"
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::Config(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Session persistence configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SessionConfig {
    /// Override for the durable token file
    pub token_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        config.apply_env_overrides();
        config.api.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Apply `TRUCKMATE_API_BASE_URL` if set and non-empty
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    /// Durable token location (configured override or data dir default)
    pub fn token_path(&self) -> PathBuf {
        self.session
            .token_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("token"))
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/truckmate/config.toml` (~/.config/truckmate/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("truckmate").join("config.toml")
    }

    /// Returns the data directory path (token, chat history, saved images)
    ///
    /// `$XDG_DATA_HOME/truckmate/` (~/.local/share/truckmate/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("truckmate")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/truckmate/` (~/.local/state/truckmate/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("truckmate")
    }

    /// Returns the CLI chat history path
    pub fn chat_history_path() -> PathBuf {
        Self::data_dir().join("chat_history.json")
    }

    /// Directory annotated assessment images are saved into
    pub fn assessments_dir() -> PathBuf {
        Self::data_dir().join("assessments")
    }

    /// Path of the log file `file_name` in the state directory
    ///
    /// `$XDG_STATE_HOME/truckmate/<file_name>` (~/.local/state/truckmate/<file_name>)
    pub fn log_path(file_name: &str) -> PathBuf {
        Self::state_dir().join(file_name)
    }
}
