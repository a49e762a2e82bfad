//! Cloud providers
//!
//! A provider turns the machines selected for a pool into worker-manager
//! launch configurations. The launch configs are opaque JSON to the rest of
//! the crate and are embedded verbatim in the worker pool definition.

mod aws;
mod gcp;

pub use aws::{AwsConfig, AwsImages, AwsProvider, AwsRegion};
pub use gcp::{GcpConfig, GcpImage, GcpProvider};

#[cfg(test)]
pub(crate) use aws::tests::aws_provider;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::machine::MachineCandidate;
use crate::error::{PoolError, Result};

/// Launch configuration builder for one cloud
pub trait Provider: Send + Sync {
    /// Worker manager provider id (e.g. community-tc-workers-aws)
    fn provider_id(&self) -> &str;

    /// Build launch configs for `machines` booted from `imageset`
    ///
    /// # Arguments
    /// * `imageset` - Imageset name from the community configuration
    /// * `machines` - Selected machines, in catalog order
    /// * `disk_size` - Boot disk size in GB
    fn build_launch_configs(
        &self,
        imageset: &str,
        machines: &[MachineCandidate],
        disk_size: u64,
    ) -> Result<Vec<serde_json::Value>>;
}

/// Providers available for pool building, keyed by cloud name
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Box<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a cloud name, replacing any previous one
    pub fn register(&mut self, cloud: impl Into<String>, provider: impl Provider + 'static) {
        self.providers.insert(cloud.into(), Box::new(provider));
    }

    pub fn get(&self, cloud: &str) -> Option<&dyn Provider> {
        self.providers.get(cloud).map(|p| p.as_ref())
    }

    pub fn clouds(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}

/// Worker image definition shared by all providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Imageset {
    #[serde(default)]
    pub worker_implementation: Option<String>,
    /// Worker configuration copied into every launch config
    #[serde(default = "empty_object")]
    pub worker_config: serde_json::Value,
    #[serde(default)]
    pub aws: Option<AwsImages>,
    #[serde(default)]
    pub gcp: Option<GcpImage>,
}

/// Imagesets keyed by name
pub type Imagesets = BTreeMap<String, Imageset>;

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn find_imageset<'a>(imagesets: &'a Imagesets, name: &str) -> Result<&'a Imageset> {
    imagesets
        .get(name)
        .ok_or_else(|| PoolError::UnknownImageset(name.to_string()))
}
