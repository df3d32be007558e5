//! Application configuration
//!
//! Layered configuration: an optional TOML file overlaid by `WISHWATCH_*`
//! environment variables (nested keys use `__`, e.g.
//! `WISHWATCH_FETCH__TIMEOUT_SECS`). Every field has a default so the
//! daemon runs from environment variables alone.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Default values for configuration
pub mod defaults {
    pub const POLL_MINUTES: u64 = 10;
    pub const WISHLIST_HOST: &str = "throne.com";
    pub const STATE_DB: &str = "data/state.sqlite3";
    pub const FETCH_TIMEOUT_SECS: u64 = 30;
    pub const FETCH_MAX_ATTEMPTS: u32 = 5;
    pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_DIRECTORY: &str = "logs";

    pub fn default_poll_minutes() -> u64 {
        POLL_MINUTES
    }

    pub fn default_wishlist_host() -> String {
        WISHLIST_HOST.to_string()
    }

    pub fn default_state_db() -> String {
        STATE_DB.to_string()
    }

    pub fn default_fetch_timeout_secs() -> u64 {
        FETCH_TIMEOUT_SECS
    }

    pub fn default_fetch_max_attempts() -> u32 {
        FETCH_MAX_ATTEMPTS
    }

    pub fn default_user_agent() -> String {
        USER_AGENT.to_string()
    }

    pub fn default_log_level() -> String {
        LOG_LEVEL.to_string()
    }

    pub fn default_log_directory() -> String {
        LOG_DIRECTORY.to_string()
    }

    pub fn default_true() -> bool {
        true
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration - {field}: {reason}")]
    Validation { field: String, reason: String },
}

/// How the process runs after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Single poll cycle, then exit.
    Once,
    /// Poll forever on the configured interval.
    #[default]
    Daemon,
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "defaults::default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "defaults::default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default = "defaults::default_fetch_max_attempts")]
    pub max_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::FETCH_TIMEOUT_SECS,
            user_agent: defaults::USER_AGENT.to_string(),
            proxy_url: None,
            max_attempts: defaults::FETCH_MAX_ATTEMPTS,
        }
    }
}

/// Notification delivery settings. No endpoint means notifications are
/// skipped (and logged), never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Extraction debugging aids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Dump raw HTML when every extraction strategy comes up empty.
    #[serde(default = "defaults::default_true")]
    pub dump_html: bool,
    /// Log a sample of extracted items at debug level.
    #[serde(default = "defaults::default_true")]
    pub log_samples: bool,
    /// Dump directory; defaults to `debug/` next to the state database.
    #[serde(default)]
    pub dump_dir: Option<String>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            dump_html: true,
            log_samples: true,
            dump_dir: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json_format: bool,
    #[serde(default = "defaults::default_true")]
    pub console_output: bool,
    #[serde(default)]
    pub file_output: bool,
    #[serde(default = "defaults::default_log_directory")]
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            directory: defaults::LOG_DIRECTORY.to_string(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Comma-separated wishlist targets (handles or full URLs).
    #[serde(default)]
    pub targets: String,
    #[serde(default = "defaults::default_poll_minutes")]
    pub poll_minutes: u64,
    #[serde(default)]
    pub mode: RunMode,
    /// Host used to expand bare handles into wishlist URLs.
    #[serde(default = "defaults::default_wishlist_host")]
    pub wishlist_host: String,
    /// SQLite database path.
    #[serde(default = "defaults::default_state_db")]
    pub state_db: String,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            targets: String::new(),
            poll_minutes: defaults::POLL_MINUTES,
            mode: RunMode::default(),
            wishlist_host: defaults::WISHLIST_HOST.to_string(),
            state_db: defaults::STATE_DB.to_string(),
            fetch: FetchConfig::default(),
            notify: NotifyConfig::default(),
            debug: DebugConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional TOML file and the environment.
    ///
    /// The file path comes from `WISHWATCH_CONFIG` (default
    /// `config/wishwatch`); environment variables always win over the file.
    pub fn load() -> Result<Self, ConfigError> {
        let config_file =
            std::env::var("WISHWATCH_CONFIG").unwrap_or_else(|_| "config/wishwatch".to_string());

        let config = Config::builder()
            .add_source(File::with_name(&config_file).required(false))
            .add_source(
                Environment::with_prefix("WISHWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Parsed target list: comma-separated, trimmed, empties removed.
    pub fn target_list(&self) -> Vec<String> {
        self.targets
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Directory for raw-HTML debug dumps.
    pub fn debug_dump_dir(&self) -> PathBuf {
        match &self.debug.dump_dir {
            Some(dir) => PathBuf::from(dir),
            None => {
                let db_path = PathBuf::from(&self.state_db);
                db_path
                    .parent()
                    .map(|parent| parent.join("debug"))
                    .unwrap_or_else(|| PathBuf::from("debug"))
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_minutes == 0 {
            return Err(ConfigError::Validation {
                field: "poll_minutes".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "fetch.timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fetch.max_attempts == 0 {
            return Err(ConfigError::Validation {
                field: "fetch.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.state_db.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "state_db".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.poll_minutes, 10);
        assert_eq!(config.mode, RunMode::Daemon);
        assert_eq!(config.wishlist_host, "throne.com");
        assert_eq!(config.state_db, "data/state.sqlite3");
        assert_eq!(config.fetch.max_attempts, 5);
        assert!(config.debug.dump_html);
        assert!(config.notify.endpoint.is_none());
    }

    #[test]
    fn target_list_splits_and_trims() {
        let config = AppConfig {
            targets: " alice , https://throne.com/u/bob/wishlist ,, ".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.target_list(),
            vec![
                "alice".to_string(),
                "https://throne.com/u/bob/wishlist".to_string()
            ]
        );
    }

    #[test]
    fn empty_targets_parse_to_empty_list() {
        assert!(AppConfig::default().target_list().is_empty());
    }

    #[test]
    fn dump_dir_defaults_next_to_state_db() {
        let config = AppConfig {
            state_db: "data/state.sqlite3".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.debug_dump_dir(), PathBuf::from("data/debug"));

        let overridden = AppConfig {
            debug: DebugConfig {
                dump_dir: Some("/tmp/dumps".to_string()),
                ..DebugConfig::default()
            },
            ..AppConfig::default()
        };
        assert_eq!(overridden.debug_dump_dir(), PathBuf::from("/tmp/dumps"));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let config = AppConfig {
            poll_minutes: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field, .. }) if field == "poll_minutes"
        ));
    }

    #[test]
    fn mode_deserializes_from_lowercase() {
        let mode: RunMode = serde_json::from_str("\"once\"").unwrap();
        assert_eq!(mode, RunMode::Once);
        let mode: RunMode = serde_json::from_str("\"daemon\"").unwrap();
        assert_eq!(mode, RunMode::Daemon);
    }
}
