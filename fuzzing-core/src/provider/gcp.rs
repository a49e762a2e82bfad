//! Google Cloud launch configurations

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Imagesets, Provider, find_imageset};
use crate::constants::GCP_PROVIDER_ID;
use crate::domain::machine::MachineCandidate;
use crate::error::{PoolError, Result};

/// GCP regions and their zones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GcpConfig {
    #[serde(default)]
    pub regions: BTreeMap<String, Vec<String>>,
}

/// Boot image for an imageset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcpImage {
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct GcpProvider {
    config: GcpConfig,
    imagesets: Arc<Imagesets>,
}

impl GcpProvider {
    pub fn new(config: GcpConfig, imagesets: Arc<Imagesets>) -> Self {
        Self { config, imagesets }
    }
}

impl Provider for GcpProvider {
    fn provider_id(&self) -> &str {
        GCP_PROVIDER_ID
    }

    fn build_launch_configs(
        &self,
        imageset: &str,
        machines: &[MachineCandidate],
        disk_size: u64,
    ) -> Result<Vec<serde_json::Value>> {
        let definition = find_imageset(&self.imagesets, imageset)?;
        let image = definition
            .gcp
            .as_ref()
            .ok_or_else(|| PoolError::ImagesetUnsupported {
                imageset: imageset.to_string(),
                provider: "gcp".to_string(),
            })?;

        let mut configs = Vec::new();
        for (region, zones) in &self.config.regions {
            for zone in zones {
                for candidate in machines {
                    configs.push(json!({
                        "capacityPerInstance": candidate.capacity_per_instance,
                        "machineType": format!("zones/{}/machineTypes/{}", zone, candidate.machine.name),
                        "region": region,
                        "zone": zone,
                        "disks": [{
                            "type": "PERSISTENT",
                            "boot": true,
                            "autoDelete": true,
                            "initializeParams": {
                                "sourceImage": image.image,
                                "diskSizeGb": disk_size,
                            },
                        }],
                        "networkInterfaces": [{"accessConfigs": [{"type": "ONE_TO_ONE_NAT"}]}],
                        "scheduling": {"onHostMaintenance": "terminate"},
                        "workerConfig": definition.worker_config,
                    }));
                }
            }
        }

        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::MachineType;
    use crate::provider::Imageset;

    fn gcp_provider() -> GcpProvider {
        let config = GcpConfig {
            regions: BTreeMap::from([(
                "us-east1".to_string(),
                vec!["us-east1-b".to_string(), "us-east1-c".to_string()],
            )]),
        };
        let imagesets = Imagesets::from([
            (
                "docker-worker".to_string(),
                Imageset {
                    worker_implementation: Some("docker-worker".to_string()),
                    worker_config: json!({"dockerConfig": {"allowPrivileged": false}}),
                    aws: None,
                    gcp: Some(GcpImage {
                        image: "projects/fuzzing/global/images/docker-worker".to_string(),
                    }),
                },
            ),
            (
                "aws-only".to_string(),
                Imageset {
                    worker_implementation: None,
                    worker_config: json!({}),
                    aws: Some(Default::default()),
                    gcp: None,
                },
            ),
        ]);
        GcpProvider::new(config, Arc::new(imagesets))
    }

    fn candidate() -> MachineCandidate {
        MachineCandidate {
            machine: MachineType {
                provider: "gcp".to_string(),
                cpu: "x64".to_string(),
                name: "n2-standard-8".to_string(),
                cores: 8,
                memory: 32.0,
                metal: false,
            },
            capacity_per_instance: 4,
        }
    }

    #[test]
    fn test_gcp_launch_configs_per_zone() {
        let configs = gcp_provider()
            .build_launch_configs("docker-worker", &[candidate()], 80)
            .unwrap();

        assert_eq!(configs.len(), 2);
        assert_eq!(
            configs[0],
            json!({
                "capacityPerInstance": 4,
                "machineType": "zones/us-east1-b/machineTypes/n2-standard-8",
                "region": "us-east1",
                "zone": "us-east1-b",
                "disks": [{
                    "type": "PERSISTENT",
                    "boot": true,
                    "autoDelete": true,
                    "initializeParams": {
                        "sourceImage": "projects/fuzzing/global/images/docker-worker",
                        "diskSizeGb": 80,
                    },
                }],
                "networkInterfaces": [{"accessConfigs": [{"type": "ONE_TO_ONE_NAT"}]}],
                "scheduling": {"onHostMaintenance": "terminate"},
                "workerConfig": {"dockerConfig": {"allowPrivileged": false}},
            })
        );
        assert_eq!(configs[1]["zone"], "us-east1-c");
    }

    #[test]
    fn test_gcp_provider_id() {
        assert_eq!(gcp_provider().provider_id(), "community-tc-workers-google");
    }

    #[test]
    fn test_gcp_requires_gcp_image() {
        let err = gcp_provider()
            .build_launch_configs("aws-only", &[candidate()], 80)
            .unwrap_err();
        assert!(matches!(err, PoolError::ImagesetUnsupported { ref provider, .. } if provider == "gcp"));
    }
}
