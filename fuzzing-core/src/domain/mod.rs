//! Core domain types
//!
//! This module contains the machine catalog and the pool configuration,
//! along with the builders that turn a pool into Taskcluster resources and
//! fuzzing tasks.

pub mod machine;
pub mod pool;

#[cfg(test)]
pub(crate) mod fixtures;
