//! Error types for pool building

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors raised while parsing, validating or building a pool
///
/// Every variant is a configuration error: it is fatal to the pool being
/// built and is never retried.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Size or duration string could not be parsed
    #[error("Invalid {kind} value: {value:?}")]
    InvalidQuantity {
        /// "size" or "duration"
        kind: &'static str,
        value: String,
    },

    /// Size or duration uses a suffix outside the known scale
    #[error("Unknown {kind} unit {unit:?} in {value:?}")]
    UnknownUnit {
        kind: &'static str,
        unit: String,
        value: String,
    },

    /// Provider missing from the machine catalog
    #[error("Unknown cloud provider in machine catalog: {0}")]
    UnknownProvider(String),

    /// Architecture missing for a provider in the machine catalog
    #[error("Architecture {cpu} not available for provider {provider}")]
    UnknownArchitecture { provider: String, cpu: String },

    /// Provider missing from the launch-config registry
    #[error("Cloud Provider {0} not available")]
    ProviderUnavailable(String),

    /// Imageset not defined in the community configuration
    #[error("Unknown imageset: {0}")]
    UnknownImageset(String),

    /// Imageset exists but has no image for the provider
    #[error("Imageset {imageset} has no image for provider {provider}")]
    ImagesetUnsupported { imageset: String, provider: String },

    /// Caller environment overlaps the fixed task environment
    #[error("Environment conflict on keys: {}", keys.join(", "))]
    EnvConflict { keys: Vec<String> },

    /// Required pool field absent after parent resolution
    #[error("Pool {pool}: missing field '{field}'")]
    MissingField { pool: String, field: &'static str },

    /// Pool field present but invalid
    #[error("Pool {pool}: invalid field '{field}': {reason}")]
    InvalidField {
        pool: String,
        field: &'static str,
        reason: String,
    },

    /// No machine satisfies the pool constraints
    #[error("Pool {0}: no machine type matches the requested resources")]
    NoMachines(String),

    /// Provider placed none of the selected machines
    #[error("Pool {0}: no launch configuration for the selected machines")]
    NoLaunchConfigs(String),

    /// Parent chain loops back on itself
    #[error("Pool {0}: parent inheritance cycle")]
    ParentCycle(String),
}

impl PoolError {
    /// Create an invalid field error
    pub fn invalid(pool: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            pool: pool.to_string(),
            field,
            reason: reason.into(),
        }
    }

    /// Check if this error comes from a catalog lookup
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UnknownProvider(_) | Self::UnknownArchitecture { .. }
        )
    }
}
