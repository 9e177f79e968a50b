// Configuration File Support
//
// This module provides configuration file parsing for the guest-quota CLI.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory: ~/.config/guest-quota/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::quota::QuotaConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Guest quota limits
    pub quota: QuotaConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level (case-insensitive)
    pub fn level(&self) -> Result<tracing::Level> {
        self.level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the persisted usage ledger (defaults to the XDG data dir)
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific path
    ///
    /// A missing file yields the default configuration. Environment
    /// overrides are applied on top either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?
        } else {
            Self::default()
        };

        let config = config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/guest-quota/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "guest-quota", "guest-quota") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join("guest-quota").join("config.toml")
        }
    }

    /// Directory the usage ledger is stored in
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "guest-quota", "guest-quota") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local").join("share").join("guest-quota")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - GUEST_QUOTA_LOG_LEVEL
    /// - GUEST_QUOTA_LOG_FORMAT
    /// - GUEST_QUOTA_DATA_DIR
    /// - GUEST_QUOTA_ENABLED and GUEST_QUOTA_*_LIMIT (see [`QuotaConfig`])
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup` instead of the process environment
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("GUEST_QUOTA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GUEST_QUOTA_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(dir) = lookup("GUEST_QUOTA_DATA_DIR") {
            if !dir.is_empty() {
                self.storage.data_dir = Some(PathBuf::from(dir));
            }
        }

        self.quota = self.quota.apply_overrides(lookup);
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level().is_err() {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        self.quota.validate().context("Invalid quota configuration")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::GatedFeature;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "compact");
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.quota, QuotaConfig::default());
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_quota() {
        let mut config = Config::default();
        config.quota.storage_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_unstorable_key() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[quota]\nstorage_key = \"guest usage\"\n").unwrap();

        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("guest usage"));
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().with_extension("nonexistent");
        let config = Config::load_from_path(&path);
        assert!(config.is_ok());
    }

    #[test]
    fn test_load_valid_toml_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
[storage]
data_dir = "/var/lib/guest-quota"

[quota]
search_limit = 10
ai_analysis_limit = 2
signup_path = "/join"
"#;

        fs::write(temp_file.path(), toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/var/lib/guest-quota")));
        assert_eq!(config.quota.limit_for(GatedFeature::Search), 10);
        assert_eq!(config.quota.limit_for(GatedFeature::AiAnalysis), 2);
        assert_eq!(config.quota.limit_for(GatedFeature::MenuScrape), 1);
        assert_eq!(config.quota.signup_path, "/join");
    }

    #[test]
    fn test_load_invalid_toml_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
[quota
search_limit = 2
"#;

        fs::write(temp_file.path(), toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path());
        assert!(config.is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[quota]\nsignup_path = \"signup\"\n").unwrap();

        assert!(Config::load_from_path(temp_file.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GUEST_QUOTA_LOG_LEVEL", "debug"),
            ("GUEST_QUOTA_LOG_FORMAT", "json"),
            ("GUEST_QUOTA_DATA_DIR", "/tmp/guest"),
            ("GUEST_QUOTA_COMPARISON_LIMIT", "9"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/guest")));
        assert_eq!(config.quota.limit_for(GatedFeature::Comparison), 9);
    }

    #[test]
    fn test_empty_data_dir_override_is_ignored() {
        let config = Config::default().apply_overrides(|name| {
            (name == "GUEST_QUOTA_DATA_DIR").then(String::new)
        });
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_data_dir_explicit() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/guest"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/guest"));
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".to_string();
        assert_eq!(config.logging.level().unwrap(), tracing::Level::DEBUG);

        config.logging.level = "loud".to_string();
        assert!(config.logging.level().is_err());
    }
}
