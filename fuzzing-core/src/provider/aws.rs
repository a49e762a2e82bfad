//! AWS launch configurations

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use super::{Imagesets, Provider, find_imageset};
use crate::constants::AWS_PROVIDER_ID;
use crate::domain::machine::MachineCandidate;
use crate::error::{PoolError, Result};

/// AWS regions workers may be launched in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub regions: BTreeMap<String, AwsRegion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsRegion {
    #[serde(default)]
    pub security_groups: Vec<String>,
    /// Availability zone to subnet id
    #[serde(default)]
    pub subnets: BTreeMap<String, String>,
}

/// AMI per region for an imageset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsImages {
    pub amis: BTreeMap<String, String>,
}

/// Spot instances on EC2, one launch config per zone and machine type
#[derive(Debug, Clone)]
pub struct AwsProvider {
    config: AwsConfig,
    imagesets: Arc<Imagesets>,
}

impl AwsProvider {
    pub fn new(config: AwsConfig, imagesets: Arc<Imagesets>) -> Self {
        Self { config, imagesets }
    }
}

impl Provider for AwsProvider {
    fn provider_id(&self) -> &str {
        AWS_PROVIDER_ID
    }

    fn build_launch_configs(
        &self,
        imageset: &str,
        machines: &[MachineCandidate],
        disk_size: u64,
    ) -> Result<Vec<serde_json::Value>> {
        let definition = find_imageset(&self.imagesets, imageset)?;
        let images = definition
            .aws
            .as_ref()
            .ok_or_else(|| PoolError::ImagesetUnsupported {
                imageset: imageset.to_string(),
                provider: "aws".to_string(),
            })?;

        let mut configs = Vec::new();
        for (region_name, ami) in &images.amis {
            let Some(region) = self.config.regions.get(region_name) else {
                warn!(imageset, region = region_name.as_str(), "No AWS configuration for region, skipping");
                continue;
            };

            for (zone, subnet) in &region.subnets {
                for candidate in machines {
                    configs.push(json!({
                        "capacityPerInstance": candidate.capacity_per_instance,
                        "launchConfig": {
                            "ImageId": ami,
                            "InstanceMarketOptions": {"MarketType": "spot"},
                            "InstanceType": candidate.machine.name,
                            "Placement": {"AvailabilityZone": zone},
                            "SecurityGroupIds": region.security_groups,
                            "SubnetId": subnet,
                            "BlockDeviceMappings": [{
                                "DeviceName": "/dev/sda1",
                                "Ebs": {
                                    "DeleteOnTermination": true,
                                    "VolumeSize": disk_size,
                                    "VolumeType": "gp2",
                                },
                            }],
                        },
                        "region": region_name,
                        "workerConfig": definition.worker_config,
                    }));
                }
            }
        }

        Ok(configs)
    }
}
