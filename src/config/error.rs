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
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid timeout for {0}: must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Invalid temperature for {field}: {value} is outside 0.0..=2.0")]
    InvalidTemperature { field: &'static str, value: f32 },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
