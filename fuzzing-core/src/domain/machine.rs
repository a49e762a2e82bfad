//! Machine catalog and filtering
//!
//! The catalog lists, per cloud provider and CPU architecture, the machine
//! types a pool may run on. Pools select machines through [`MachineCatalog::filter`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PoolError, Result};

/// A machine type offered by a cloud provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineType {
    pub provider: String,
    /// CPU architecture (e.g. x64, arm64)
    pub cpu: String,
    /// Provider-specific instance type (e.g. m5.large, n2-standard-8)
    pub name: String,
    pub cores: u32,
    /// Memory in GB
    pub memory: f64,
    pub metal: bool,
}

impl MachineType {
    /// Memory available per core in GB
    pub fn memory_per_core(&self) -> f64 {
        if self.cores == 0 {
            return 0.0;
        }
        self.memory / self.cores as f64
    }
}

/// A machine selected for a pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineCandidate {
    pub machine: MachineType,
    /// Number of tasks a single instance hosts
    pub capacity_per_instance: u32,
}

/// Machine types grouped by provider then architecture
///
/// Machines keep their insertion order inside an architecture; filtering
/// never reorders them.
#[derive(Debug, Clone, Default)]
pub struct MachineCatalog {
    providers: BTreeMap<String, BTreeMap<String, Vec<MachineType>>>,
}

impl MachineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a machine to its provider/architecture list
    pub fn insert(&mut self, machine: MachineType) {
        self.providers
            .entry(machine.provider.clone())
            .or_default()
            .entry(machine.cpu.clone())
            .or_default()
            .push(machine);
    }

    /// All machines for a provider and architecture, in catalog order
    ///
    /// # Errors
    /// [`PoolError::UnknownProvider`] or [`PoolError::UnknownArchitecture`]
    pub fn machines(&self, provider: &str, cpu: &str) -> Result<&[MachineType]> {
        let architectures = self
            .providers
            .get(provider)
            .ok_or_else(|| PoolError::UnknownProvider(provider.to_string()))?;

        architectures
            .get(cpu)
            .map(Vec::as_slice)
            .ok_or_else(|| PoolError::UnknownArchitecture {
                provider: provider.to_string(),
                cpu: cpu.to_string(),
            })
    }

    /// Machines able to host a task of `cores_per_task` cores with at least
    /// `minimum_memory_per_core` GB per core
    ///
    /// Lookup errors are raised eagerly; the returned iterator itself is lazy
    /// and may be empty. `metal` selects bare-metal machines exclusively:
    /// with `metal = false` bare-metal machines are never returned.
    pub fn filter<'a>(
        &'a self,
        provider: &str,
        cpu: &str,
        cores_per_task: u32,
        minimum_memory_per_core: f64,
        metal: bool,
    ) -> Result<impl Iterator<Item = &'a MachineType> + use<'a>> {
        let machines = self.machines(provider, cpu)?;

        Ok(machines.iter().filter(move |machine| {
            machine.metal == metal
                && machine.cores >= cores_per_task
                && machine.memory_per_core() >= minimum_memory_per_core
        }))
    }

    /// Provider names present in the catalog
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Total number of machine types
    pub fn len(&self) -> usize {
        self.providers
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<MachineType> for MachineCatalog {
    fn from_iter<I: IntoIterator<Item = MachineType>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for machine in iter {
            catalog.insert(machine);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::mock_machines;
    use rstest::rstest;

    fn names(catalog: &MachineCatalog, provider: &str, cpu: &str, cores: u32, ram: f64, metal: bool) -> Vec<String> {
        catalog
            .filter(provider, cpu, cores, ram, metal)
            .unwrap()
            .map(|m| m.name.clone())
            .collect()
    }

    #[rstest]
    #[case("gcp", "x64", 1, 1.0, false, &["base", "2-cpus", "more-ram"])]
    #[case("gcp", "x64", 2, 1.0, false, &["2-cpus", "more-ram"])]
    #[case("gcp", "x64", 2, 5.0, false, &["more-ram"])]
    #[case("gcp", "x64", 1, 1.0, true, &["metal"])]
    #[case("aws", "arm64", 1, 1.0, false, &["a1", "a2", "a3"])]
    #[case("aws", "arm64", 2, 1.0, false, &["a2", "a3"])]
    #[case("aws", "arm64", 12, 32.0, false, &["a3"])]
    #[case("aws", "arm64", 1, 1.0, true, &[])]
    fn test_machine_filters(
        #[case] provider: &str,
        #[case] cpu: &str,
        #[case] cores: u32,
        #[case] ram: f64,
        #[case] metal: bool,
        #[case] expected: &[&str],
    ) {
        let catalog = mock_machines();
        assert_eq!(names(&catalog, provider, cpu, cores, ram, metal), expected);
    }

    #[rstest]
    #[case(1, 1.0, false)]
    #[case(64, 0.0, true)]
    #[case(4, 512.0, false)]
    fn test_absent_architecture_is_lookup_error(#[case] cores: u32, #[case] ram: f64, #[case] metal: bool) {
        let catalog = mock_machines();
        let err = catalog.filter("aws", "x64", cores, ram, metal).err().unwrap();
        assert!(matches!(err, PoolError::UnknownArchitecture { .. }));
        assert!(err.is_lookup());
    }

    #[test]
    fn test_unknown_provider_is_lookup_error() {
        let catalog = mock_machines();
        let err = catalog.filter("dummy", "x64", 1, 1.0, false).err().unwrap();
        assert!(matches!(err, PoolError::UnknownProvider(ref p) if p == "dummy"));
    }

    #[test]
    fn test_filter_is_monotonic() {
        let catalog = mock_machines();
        for (provider, cpu) in [("gcp", "x64"), ("aws", "arm64")] {
            for metal in [false, true] {
                for cores in 1..=24 {
                    for ram in [0.5, 1.0, 2.0, 4.0, 8.0, 32.0, 64.0] {
                        let base = names(&catalog, provider, cpu, cores, ram, metal);
                        let more_cores = names(&catalog, provider, cpu, cores + 1, ram, metal);
                        let more_ram = names(&catalog, provider, cpu, cores, ram * 2.0, metal);
                        assert!(more_cores.iter().all(|m| base.contains(m)));
                        assert!(more_ram.iter().all(|m| base.contains(m)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_metal_partitions_are_disjoint() {
        let catalog = mock_machines();
        let all: Vec<String> = catalog
            .machines("gcp", "x64")
            .unwrap()
            .iter()
            .map(|m| m.name.clone())
            .collect();
        let metal = names(&catalog, "gcp", "x64", 1, 0.0, true);
        let regular = names(&catalog, "gcp", "x64", 1, 0.0, false);

        assert!(metal.iter().all(|m| !regular.contains(m)));
        let mut union: Vec<String> = regular.into_iter().chain(metal).collect();
        union.sort();
        let mut all_sorted = all;
        all_sorted.sort();
        assert_eq!(union, all_sorted);
    }

    #[test]
    fn test_metal_is_never_a_fallback() {
        let catalog = mock_machines();
        // only "metal" has 4 cores on gcp
        assert!(names(&catalog, "gcp", "x64", 4, 1.0, false).is_empty());
        assert_eq!(names(&catalog, "gcp", "x64", 4, 1.0, true), ["metal"]);
    }

    #[test]
    fn test_catalog_counts() {
        let catalog = mock_machines();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.providers().collect::<Vec<_>>(), ["aws", "gcp"]);
        assert!(MachineCatalog::new().is_empty());
    }
}
