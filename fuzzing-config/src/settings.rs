//! Decision settings
//!
//! Tell the decision task where the configuration trees are checked out.
//! Settings come from a local YAML/JSON file or from the body of a
//! Taskcluster secret.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::community::CommunityConfig;
use crate::error::{ConfigError, Result};
use crate::pool::PoolDirectory;
use crate::read_yaml;

pub const MACHINES_FILE: &str = "machines.yml";
pub const POOLS_DIR: &str = "pools";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Checkout of the community configuration (imagesets, clouds)
    pub community_config_dir: PathBuf,
    /// Checkout of the fuzzing configuration (machines, pools)
    pub fuzzing_config_dir: PathBuf,
}

impl Settings {
    /// Load settings from a local file
    ///
    /// Relative directories are taken relative to the file's location.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut settings: Settings = read_yaml(path)?;
        if let Some(base) = path.parent() {
            settings.community_config_dir = base.join(&settings.community_config_dir);
            settings.fuzzing_config_dir = base.join(&settings.fuzzing_config_dir);
        }
        Ok(settings)
    }

    /// Load settings from a secret body
    pub fn from_secret(secret: serde_json::Value) -> Result<Self> {
        serde_json::from_value(secret)
            .map_err(|e| ConfigError::settings(format!("malformed secret: {}", e)))
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        for (label, dir) in [
            ("community_config_dir", &self.community_config_dir),
            ("fuzzing_config_dir", &self.fuzzing_config_dir),
        ] {
            if !dir.is_dir() {
                return Err(ConfigError::settings(format!(
                    "{} is not a directory: {}",
                    label,
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn machines_path(&self) -> PathBuf {
        self.fuzzing_config_dir.join(MACHINES_FILE)
    }

    pub fn pools(&self) -> PoolDirectory {
        PoolDirectory::new(self.fuzzing_config_dir.join(POOLS_DIR))
    }

    pub fn community(&self) -> Result<CommunityConfig> {
        CommunityConfig::load(&self.community_config_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_settings_from_file_resolves_relative_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("community")).unwrap();
        fs::create_dir(dir.path().join("fuzzing")).unwrap();
        let path = dir.path().join("settings.yml");
        fs::write(&path, "community_config_dir: community\nfuzzing_config_dir: fuzzing\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.community_config_dir, dir.path().join("community"));
        assert_eq!(settings.machines_path(), dir.path().join("fuzzing/machines.yml"));
        assert_eq!(settings.pools().root(), dir.path().join("fuzzing/pools"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let settings = Settings {
            community_config_dir: PathBuf::from("/nonexistent/community"),
            fuzzing_config_dir: PathBuf::from("/nonexistent/fuzzing"),
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("community_config_dir"));
    }

    #[test]
    fn test_settings_from_secret() {
        let settings = Settings::from_secret(serde_json::json!({
            "community_config_dir": "/checkout/community",
            "fuzzing_config_dir": "/checkout/fuzzing",
        }))
        .unwrap();
        assert_eq!(settings.fuzzing_config_dir, PathBuf::from("/checkout/fuzzing"));

        assert!(matches!(
            Settings::from_secret(serde_json::json!({"fuzzing_config_dir": 3})),
            Err(ConfigError::InvalidSettings(_))
        ));
    }
}
