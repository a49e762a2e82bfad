//! Pool file loading
//!
//! Pools live in a single directory, one `<name>.yml` file per pool. A pool
//! may list `parents` by name; they are looked up in the same directory.

use fuzzing_core::{PoolConfigInput, PoolConfiguration};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::read_yaml;

const POOL_EXTENSION: &str = "yml";

/// Directory of pool files
#[derive(Debug, Clone)]
pub struct PoolDirectory {
    root: PathBuf,
}

impl PoolDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of every pool in the directory, sorted
    pub fn pool_names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| ConfigError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(POOL_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Raw definition of a single pool file, parents unresolved
    pub fn load_raw(&self, name: &str) -> Result<PoolConfigInput> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::UnknownPool(name.to_string()));
        }

        let path = self.root.join(format!("{}.{}", name, POOL_EXTENSION));
        if !path.is_file() {
            return Err(ConfigError::UnknownPool(name.to_string()));
        }

        debug!(path = %path.display(), "Reading pool file");
        read_yaml(&path)
    }

    /// Load a pool with its parents resolved and its fields validated
    pub fn load(&self, name: &str) -> Result<PoolConfiguration> {
        let input = PoolConfigInput::resolve(name, |pool| self.load_raw(pool))?;
        let pool = PoolConfiguration::new(name, input)?;
        info!(pool = pool.id.as_str(), tasks = pool.tasks, "Loaded pool");
        Ok(pool)
    }

    /// Names listed as a parent by at least one pool file
    pub fn parent_names(&self) -> Result<BTreeSet<String>> {
        let mut parents = BTreeSet::new();
        for name in self.pool_names()? {
            parents.extend(self.load_raw(&name)?.parents);
        }
        Ok(parents)
    }

    /// Load every pool in the directory
    ///
    /// Files used as a parent only hold shared settings and are not pools
    /// of their own. Stops at the first pool that fails to load.
    pub fn load_all(&self) -> Result<Vec<PoolConfiguration>> {
        let parents = self.parent_names()?;
        self.pool_names()?
            .iter()
            .filter(|name| {
                let is_parent = parents.contains(name.as_str());
                if is_parent {
                    debug!(pool = name.as_str(), "Skipping parent pool file");
                }
                !is_parent
            })
            .map(|name| self.load(name))
            .collect()
    }
}
