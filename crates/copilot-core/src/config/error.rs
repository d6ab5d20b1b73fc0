//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating [`super::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required field missing: {0}")]
    RequiredFieldMissing(String),

    #[error("invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("parse error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
