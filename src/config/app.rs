//! Application configuration structures.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scraper::ScraperRegistry;
pub use crate::source::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS};

use super::{ConfigError, Dsn};

// =============================================================================
// Constants
// =============================================================================

/// Default DSN (local server, anonymous root).
pub const DEFAULT_DSN: &str = "mysql://root@localhost:3306/";

/// Default deadline for one collection cycle (10 seconds).
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default observation channel capacity.
pub const DEFAULT_SINK_CAPACITY: usize = 1024;

/// Parse a non-zero humantime duration such as `10s`, `1m30s` or `250ms`.
///
/// # Examples
///
/// ```
/// use mysqld_sys_scraper::config::parse_timeout;
///
/// assert_eq!(parse_timeout("1m30s").unwrap().as_secs(), 90);
/// assert!(parse_timeout("0s").is_err());
/// ```
pub fn parse_timeout(s: &str) -> Result<Duration, String> {
    let timeout = humantime::parse_duration(s.trim()).map_err(|e| e.to_string())?;
    if timeout.is_zero() {
        return Err("timeout must be non-zero".to_string());
    }
    Ok(timeout)
}

fn default_dsn() -> String {
    DEFAULT_DSN.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_scrape_timeout() -> Duration {
    DEFAULT_SCRAPE_TIMEOUT
}

fn default_sink_capacity() -> usize {
    DEFAULT_SINK_CAPACITY
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; `${VAR}` and `${VAR:-default}` are expanded.
    #[serde(default = "default_dsn")]
    pub dsn: String,

    /// Maximum pooled connections (default: 3).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout (default: 10s).
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: default_dsn(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl DatabaseConfig {
    /// Expand and validate the configured DSN.
    ///
    /// # Errors
    /// Returns `ConfigError` if a placeholder is unset or the URL is invalid.
    pub fn parsed_dsn(&self) -> Result<Dsn, ConfigError> {
        Dsn::parse(&self.dsn)
    }
}

// =============================================================================
// Scrape Configuration
// =============================================================================

/// Collection cycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Deadline for one collection cycle (default: 10s).
    #[serde(default = "default_scrape_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Observation channel capacity (default: 1024).
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,

    /// Scrapers to run by name; empty means all built-ins.
    #[serde(default)]
    pub scrapers: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SCRAPE_TIMEOUT,
            sink_capacity: DEFAULT_SINK_CAPACITY,
            scrapers: Vec::new(),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Scrape configuration.
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.parsed_dsn()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database max_connections must be positive".to_string(),
            ));
        }

        if self.scrape.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "scrape timeout must be non-zero".to_string(),
            ));
        }

        if self.scrape.sink_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "scrape sink_capacity must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.scrape.scrapers {
            if !seen.insert(name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate scraper name: '{}'",
                    name
                )));
            }
        }
        ScraperRegistry::builtin()
            .select(&self.scrape.scrapers)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }
}
