//! Configuration management for comicvine-export.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the Comic Vine API key
pub const API_KEY_ENV: &str = "COMICVINE_API_KEY";

/// Where a loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the given file
    File,
    /// File was missing; built-in defaults
    Defaults,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Comic Vine API settings
    pub comicvine: ComicVineConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Comic Vine API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicVineConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// API key (may be left empty and supplied via env or CLI)
    #[serde(default)]
    pub api_key: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,

    /// Items requested per page from the issue list endpoint
    pub page_size: u32,

    /// Delay between per-issue detail fetches in seconds
    pub request_delay_seconds: u64,

    /// Blanket wait after the server signals throttling, in seconds
    pub throttle_wait_seconds: u64,

    /// Per-endpoint quota settings
    pub rate_limit: RateLimitConfig,
}

/// Per-endpoint quota configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests to one endpoint within a window
    pub requests_per_window: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Series name to search for
    pub series: String,

    /// CSV output file (relative to the working directory or absolute)
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            series: String::new(),
            output_path: "comic_series_info.csv".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            comicvine: ComicVineConfig {
                base_url: "https://comicvine.gamespot.com/api".to_string(),
                api_key: String::new(),
                user_agent: "comicvine-export/0.1.0".to_string(),
                timeout_seconds: 30,
                page_size: 100,
                request_delay_seconds: 20,
                throttle_wait_seconds: 3600,
                rate_limit: RateLimitConfig {
                    requests_per_window: 200,
                    window_seconds: 3600,
                },
            },
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path).map(|(config, _)| config)
    }

    /// Load configuration and report where it came from
    ///
    /// Nothing is logged here, so callers can report the source once logging
    /// is up.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigSource)> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok((config, ConfigSource::File))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }

    /// Get the CSV output path
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.export.output_path)
    }

    /// Resolve the API key: CLI flag, then `COMICVINE_API_KEY`, then config file
    pub fn api_key(&self, cli_key: Option<&str>) -> Option<String> {
        self.resolve_api_key(cli_key, std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, cli_key: Option<&str>, env_key: Option<String>) -> Option<String> {
        let non_blank = |key: &str| Some(key.trim()).filter(|k| !k.is_empty()).map(str::to_string);

        cli_key
            .and_then(non_blank)
            .or_else(|| env_key.as_deref().and_then(non_blank))
            .or_else(|| non_blank(&self.comicvine.api_key))
    }
}

impl ComicVineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_seconds)
    }

    pub fn throttle_wait(&self) -> Duration {
        Duration::from_secs(self.throttle_wait_seconds)
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.comicvine.page_size, 100);
        assert_eq!(config.comicvine.rate_limit.requests_per_window, 200);
        assert_eq!(config.comicvine.rate_limit.window(), Duration::from_secs(3600));
        assert_eq!(config.comicvine.request_delay(), Duration::from_secs(20));
        assert_eq!(config.export.output_path, "comic_series_info.csv");
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.export.series = "Big Comic Spirits".to_string();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(
            loaded_config.comicvine.base_url,
            original_config.comicvine.base_url
        );
        assert_eq!(loaded_config.export.series, "Big Comic Spirits");

        Ok(())
    }

    #[test]
    fn test_missing_export_section_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut value = toml::Value::try_from(Config::default())?;
        value
            .as_table_mut()
            .expect("config serializes to a table")
            .remove("export");
        std::fs::write(&config_path, toml::to_string(&value)?)?;

        let loaded = Config::from_file(&config_path)?;
        assert_eq!(loaded.export.output_path, "comic_series_info.csv");
        assert!(loaded.export.series.is_empty());

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_load_reports_source() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let (_, source) = Config::load(&config_path)?;
        assert_eq!(source, ConfigSource::Defaults);

        Config::default().save(&config_path)?;
        let (_, source) = Config::load(&config_path)?;
        assert_eq!(source, ConfigSource::File);

        Ok(())
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        let log_dir = config.log_dir();
        assert!(log_dir.ends_with("data/logs"));

        assert_eq!(config.output_path(), PathBuf::from("comic_series_info.csv"));
    }

    #[test]
    fn test_api_key_precedence() {
        let mut config = Config::default();
        config.comicvine.api_key = "from-file".to_string();

        assert_eq!(
            config.resolve_api_key(Some("from-cli"), Some("from-env".to_string())),
            Some("from-cli".to_string())
        );
        assert_eq!(
            config.resolve_api_key(None, Some("from-env".to_string())),
            Some("from-env".to_string())
        );
        assert_eq!(
            config.resolve_api_key(None, None),
            Some("from-file".to_string())
        );
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config::default();
        assert_eq!(config.resolve_api_key(None, None), None);
        assert_eq!(config.resolve_api_key(Some("  "), None), None);
        assert_eq!(config.resolve_api_key(None, Some(String::new())), None);
    }

    #[test]
    fn test_blank_api_key_falls_through_to_next_source() {
        let mut config = Config::default();
        config.comicvine.api_key = " from-file ".to_string();

        assert_eq!(
            config.resolve_api_key(Some("  "), Some("from-env".to_string())),
            Some("from-env".to_string())
        );
        assert_eq!(
            config.resolve_api_key(Some(""), Some(String::new())),
            Some("from-file".to_string())
        );
    }
}
