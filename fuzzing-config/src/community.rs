//! Community configuration
//!
//! Imagesets and cloud regions shared with the rest of the Taskcluster
//! deployment. The directory holds two files:
//! - `imagesets.yml`: imageset name to worker config and per-cloud images
//! - `clouds.yml`: regions (and zones/subnets) workers may run in

use fuzzing_core::provider::{AwsConfig, AwsProvider, GcpConfig, GcpProvider, Imagesets};
use fuzzing_core::ProviderRegistry;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::read_yaml;

pub const IMAGESETS_FILE: &str = "imagesets.yml";
pub const CLOUDS_FILE: &str = "clouds.yml";

/// Per-cloud settings; a cloud without a section gets no provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudsConfig {
    #[serde(default)]
    pub aws: Option<AwsConfig>,
    #[serde(default)]
    pub gcp: Option<GcpConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct CommunityConfig {
    pub imagesets: Arc<Imagesets>,
    pub clouds: CloudsConfig,
}

impl CommunityConfig {
    /// Load both files from a community configuration directory
    pub fn load(dir: &Path) -> Result<Self> {
        let imagesets: Imagesets = read_yaml(&dir.join(IMAGESETS_FILE))?;
        let clouds: CloudsConfig = read_yaml(&dir.join(CLOUDS_FILE))?;
        info!(
            dir = %dir.display(),
            imagesets = imagesets.len(),
            "Loaded community configuration"
        );

        Ok(Self {
            imagesets: Arc::new(imagesets),
            clouds,
        })
    }

    /// Launch config builders for every configured cloud
    pub fn providers(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        if let Some(aws) = &self.clouds.aws {
            registry.register("aws", AwsProvider::new(aws.clone(), self.imagesets.clone()));
        }
        if let Some(gcp) = &self.clouds.gcp {
            registry.register("gcp", GcpProvider::new(gcp.clone(), self.imagesets.clone()));
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::fs;

    const IMAGESETS: &str = r#"
generic-worker-A:
  workerImplementation: generic-worker
  workerConfig:
    genericWorker:
      config:
        anyKey: anyValue
  aws:
    amis:
      us-west-1: ami-1234
docker-worker:
  gcp:
    image: projects/fuzzing/global/images/docker-worker
"#;

    const CLOUDS: &str = r#"
aws:
  regions:
    us-west-1:
      security_groups: [sg-A]
      subnets:
        us-west-1a: subnet-XXX
"#;

    #[test]
    fn test_load_community_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(IMAGESETS_FILE), IMAGESETS).unwrap();
        fs::write(dir.path().join(CLOUDS_FILE), CLOUDS).unwrap();

        let community = CommunityConfig::load(dir.path()).unwrap();
        assert_eq!(community.imagesets.len(), 2);
        assert!(community.clouds.gcp.is_none());

        let providers = community.providers();
        assert_eq!(providers.clouds().collect::<Vec<_>>(), ["aws"]);
        assert_eq!(
            providers.get("aws").unwrap().provider_id(),
            "community-tc-workers-aws"
        );
    }

    #[test]
    fn test_missing_clouds_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(IMAGESETS_FILE), IMAGESETS).unwrap();
        assert!(matches!(
            CommunityConfig::load(dir.path()),
            Err(ConfigError::Io { .. })
        ));
    }
}
