//! Fuzzing configuration loading
//!
//! This crate reads the configuration trees the decision task works from:
//! - Pool files, with parent inheritance resolved into flat pools
//! - The machine catalog
//! - The community configuration (imagesets and cloud regions)
//! - Decision settings, from a local file or a secret payload

pub mod community;
pub mod error;
pub mod machines;
pub mod pool;
pub mod settings;

pub use community::{CloudsConfig, CommunityConfig};
pub use error::{ConfigError, Result};
pub use machines::{load_machine_catalog, parse_machine_catalog};
pub use pool::PoolDirectory;
pub use settings::Settings;

use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a YAML file
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
