//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Interval must be positive: {0}")]
    ZeroInterval(&'static str),

    #[error("Capacity must be positive: {0}")]
    ZeroCapacity(&'static str),

    #[error("Compound mood support must be in (0, 1]")]
    InvalidSupport,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
