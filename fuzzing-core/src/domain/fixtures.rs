//! Shared test catalog

use super::machine::{MachineCatalog, MachineType};

fn machine(provider: &str, cpu: &str, name: &str, cores: u32, memory: f64, metal: bool) -> MachineType {
    MachineType {
        provider: provider.to_string(),
        cpu: cpu.to_string(),
        name: name.to_string(),
        cores,
        memory,
        metal,
    }
}

pub(crate) fn mock_machines() -> MachineCatalog {
    [
        machine("gcp", "x64", "base", 1, 1.0, false),
        machine("gcp", "x64", "2-cpus", 2, 2.0, false),
        machine("gcp", "x64", "more-ram", 2, 12.0, false),
        machine("gcp", "x64", "metal", 4, 4.0, true),
        machine("aws", "arm64", "a1", 1, 2.0, false),
        machine("aws", "arm64", "a2", 2, 8.0, false),
        machine("aws", "arm64", "a3", 20, 1280.0, false),
    ]
    .into_iter()
    .collect()
}
