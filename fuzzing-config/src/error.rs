//! Error types for configuration loading

use fuzzing_core::PoolError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid YAML for the expected schema
    #[error("Failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Pool validation or resolution failed
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Pool file does not exist
    #[error("Unknown pool: {0}")]
    UnknownPool(String),

    /// Machine catalog entry is malformed
    #[error("Invalid machine {provider}/{cpu}/{name}: {reason}")]
    InvalidMachine {
        provider: String,
        cpu: String,
        name: String,
        reason: String,
    },

    /// Decision settings are malformed
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl ConfigError {
    /// Create an invalid settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }
}
