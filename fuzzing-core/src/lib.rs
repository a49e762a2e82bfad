//! Fuzzing Core
//!
//! Core types and builders for the fuzzing decision system.
//!
//! This crate contains:
//! - Domain types: machine catalog, pool configuration and the builders that
//!   turn a pool into platform resources and fuzzing tasks
//! - DTOs: the worker-pool, hook, role and task records handed to Taskcluster
//! - Providers: cloud-specific launch configuration builders
//! - Units: size and duration parsing used by pool files

pub mod clock;
pub mod constants;
pub mod domain;
pub mod dto;
pub mod error;
pub mod provider;
pub mod units;

pub use clock::{Clock, FixedClock, IdGenerator, SequentialIds, SlugIds, SystemClock};
pub use domain::machine::{MachineCandidate, MachineCatalog, MachineType};
pub use domain::pool::{EnvVars, Platform, PoolConfigInput, PoolConfiguration};
pub use error::{PoolError, Result};
pub use provider::{Provider, ProviderRegistry};
