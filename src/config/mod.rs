//! Configuration module for the scraper binary.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Database settings (DSN with `${VAR}` expansion, pool size, connect timeout)
//! - Scrape settings (timeout, sink capacity, enabled scrapers)

mod app;
mod dsn;
mod error;

pub use app::{AppConfig, DatabaseConfig, ScrapeConfig, parse_timeout};
pub use dsn::{Dsn, expand_env_vars};
pub use error::ConfigError;

// Re-export constants
pub use app::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DSN, DEFAULT_MAX_CONNECTIONS, DEFAULT_SCRAPE_TIMEOUT,
    DEFAULT_SINK_CAPACITY,
};
