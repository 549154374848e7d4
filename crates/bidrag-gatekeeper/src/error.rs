//! Gatekeeper error types

use bidrag_domain::InvalidIntervalError;
use thiserror::Error;

/// Errors that can occur while assembling facts or loading configuration
///
/// Validation itself never fails; irregular timelines are reported as
/// findings.
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// A fact row ends before it starts
    #[error("Invalid period: {0}")]
    InvalidInterval(#[from] InvalidIntervalError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Case facts are not valid JSON
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Result alias for gatekeeper operations
pub type Result<T> = std::result::Result<T, GatekeeperError>;
