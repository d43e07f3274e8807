//! Configuration management for the stormtrack crawler
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// NHC archive root
pub const DEFAULT_BASE_URL: &str = "https://www.nhc.noaa.gov/archive/";

/// Desktop browser identity; the archive rejects default client agents
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Output locations
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Archive root, year pages live at `{base_url}{year}/`
    pub base_url: String,

    /// Rate limit (requests per second)
    pub rate_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Courtesy pause after each advisory download, in milliseconds
    pub download_delay_ms: u64,

    /// User agent string
    pub user_agent: String,
}

/// Output directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the `{year}/{basin}/{storm}/{product}` tree
    pub raw_dir: PathBuf,

    /// Matched storm tables, track tables and JSON bundles
    pub processed_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("STORMTRACK_BASE_URL").unwrap_or(defaults.crawler.base_url);

        let rate_limit = std::env::var("STORMTRACK_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.crawler.rate_limit);

        let request_timeout_secs = std::env::var("STORMTRACK_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.crawler.request_timeout_secs);

        let download_delay_ms = std::env::var("STORMTRACK_DOWNLOAD_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.crawler.download_delay_ms);

        let user_agent =
            std::env::var("STORMTRACK_USER_AGENT").unwrap_or(defaults.crawler.user_agent);

        let raw_dir = std::env::var("STORMTRACK_RAW_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output.raw_dir);

        let processed_dir = std::env::var("STORMTRACK_PROCESSED_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output.processed_dir);

        let log_level =
            std::env::var("STORMTRACK_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("STORMTRACK_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            crawler: CrawlerConfig {
                base_url,
                rate_limit,
                request_timeout_secs,
                download_delay_ms,
                user_agent,
            },
            output: OutputConfig {
                raw_dir,
                processed_dir,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.crawler.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.crawler.base_url))?;

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Get the courtesy delay between downloads as Duration
    #[must_use]
    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.download_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig {
                base_url: String::from(DEFAULT_BASE_URL),
                rate_limit: 5,
                request_timeout_secs: 30,
                download_delay_ms: 300,
                user_agent: String::from(DEFAULT_USER_AGENT),
            },
            output: OutputConfig {
                raw_dir: PathBuf::from("data/output/raw/noaa_complete"),
                processed_dir: PathBuf::from("data/output/processed"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut config = Config::default();
        config.crawler.rate_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = Config::default();
        config.crawler.base_url = String::from("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.download_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_toml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stormtrack.toml");
        let mut config = Config::default();
        config.crawler.download_delay_ms = 0;
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.crawler.download_delay_ms, 0);
        assert_eq!(loaded.crawler.base_url, DEFAULT_BASE_URL);
    }
}
