//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// The DSN is not a valid URL after expansion.
    #[error("invalid database dsn: {0}")]
    InvalidDsn(#[from] url::ParseError),

    /// The DSN references an unset environment variable with no default.
    #[error("environment variable {0} referenced by the dsn is not set")]
    MissingEnvVar(String),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}
