//! Machine catalog loading
//!
//! The catalog file maps provider, then architecture, then machine name to
//! the machine's resources:
//!
//! ```yaml
//! aws:
//!   arm64:
//!     a1.xlarge: {cpu: 4, ram: 8}
//!     a1.metal: {cpu: 16, ram: 32, metal: true}
//! ```
//!
//! Machines keep the order in which they appear in the file.

use fuzzing_core::{MachineCatalog, MachineType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::read_yaml;

/// Mapping keeps insertion order, which is the selection order
type CatalogFile = BTreeMap<String, BTreeMap<String, serde_yaml::Mapping>>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MachineSpec {
    cpu: u32,
    /// GB
    ram: f64,
    #[serde(default)]
    metal: bool,
}

/// Load the machine catalog from a YAML file
pub fn load_machine_catalog(path: &Path) -> Result<MachineCatalog> {
    let file: CatalogFile = read_yaml(path)?;
    let catalog = build_catalog(file)?;
    info!(path = %path.display(), machines = catalog.len(), "Loaded machine catalog");
    Ok(catalog)
}

/// Parse a machine catalog from YAML text
pub fn parse_machine_catalog(source: &str) -> Result<MachineCatalog> {
    let file: CatalogFile = serde_yaml::from_str(source).map_err(|source| ConfigError::Yaml {
        path: "<inline>".into(),
        source,
    })?;
    build_catalog(file)
}

fn build_catalog(file: CatalogFile) -> Result<MachineCatalog> {
    let mut catalog = MachineCatalog::new();

    for (provider, architectures) in file {
        for (cpu, machines) in architectures {
            for (name, spec) in machines {
                let invalid = |name: &str, reason: String| ConfigError::InvalidMachine {
                    provider: provider.clone(),
                    cpu: cpu.clone(),
                    name: name.to_string(),
                    reason,
                };

                let name = match name {
                    serde_yaml::Value::String(name) => name,
                    other => return Err(invalid(&format!("{:?}", other), "name must be a string".to_string())),
                };
                let spec: MachineSpec =
                    serde_yaml::from_value(spec).map_err(|e| invalid(&name, e.to_string()))?;
                if spec.cpu == 0 {
                    return Err(invalid(&name, "cpu must be at least 1".to_string()));
                }
                if !spec.ram.is_finite() || spec.ram < 0.0 {
                    return Err(invalid(&name, "ram must be a non-negative number".to_string()));
                }

                catalog.insert(MachineType {
                    provider: provider.clone(),
                    cpu: cpu.clone(),
                    name,
                    cores: spec.cpu,
                    memory: spec.ram,
                    metal: spec.metal,
                });
            }
        }
    }

    Ok(catalog)
}
