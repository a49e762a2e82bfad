//! Pool configuration
//!
//! A pool file is read into a [`PoolConfigInput`], where every field is
//! optional. Parent inheritance is resolved on that raw form with
//! [`PoolConfigInput::resolve`], then [`PoolConfiguration::new`] validates the
//! flat result once. Builders only ever see a validated [`PoolConfiguration`].

mod resources;
mod tasks;

pub use tasks::TaskBatch;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::constants::{MAX_CYCLE_TIME, POOL_ENV_KEY};
use crate::domain::machine::{MachineCandidate, MachineCatalog};
use crate::error::{PoolError, Result};
use crate::units::{GIB, Quantity};

/// Environment variables passed to a task payload
pub type EnvVars = BTreeMap<String, String>;

/// Operating system of the fuzzing target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command run in the fuzzing container, as a single string or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandLine {
    Shell(String),
    Args(Vec<String>),
}

impl CommandLine {
    /// Split into arguments; a single string is split on whitespace
    pub fn into_args(self) -> Vec<String> {
        match self {
            CommandLine::Shell(line) => line.split_whitespace().map(str::to_string).collect(),
            CommandLine::Args(args) => args,
        }
    }
}

/// Raw pool definition as written in a pool file
///
/// Every field is optional so that a pool may take part of its definition
/// from its parents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfigInput {
    #[serde(default)]
    pub parents: Vec<String>,
    pub name: Option<String>,
    pub cloud: Option<String>,
    pub platform: Option<String>,
    pub cpu: Option<String>,
    pub tasks: Option<i64>,
    pub cores_per_task: Option<i64>,
    pub minimum_memory_per_core: Option<Quantity>,
    pub metal: Option<bool>,
    pub disk_size: Option<Quantity>,
    pub cycle_time: Option<Quantity>,
    pub imageset: Option<String>,
    pub container: Option<String>,
    pub command: Option<CommandLine>,
    #[serde(default)]
    pub macros: EnvVars,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl PoolConfigInput {
    /// Layer this definition on top of `base`
    ///
    /// Fields set here win. Scopes are appended to the base scopes without
    /// duplicates and macros are merged with this definition taking
    /// precedence. `parents` is kept from this definition.
    pub fn inherit(self, base: PoolConfigInput) -> PoolConfigInput {
        let mut scopes = base.scopes;
        for scope in self.scopes {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }

        let mut macros = base.macros;
        macros.extend(self.macros);

        PoolConfigInput {
            parents: self.parents,
            name: self.name.or(base.name),
            cloud: self.cloud.or(base.cloud),
            platform: self.platform.or(base.platform),
            cpu: self.cpu.or(base.cpu),
            tasks: self.tasks.or(base.tasks),
            cores_per_task: self.cores_per_task.or(base.cores_per_task),
            minimum_memory_per_core: self
                .minimum_memory_per_core
                .or(base.minimum_memory_per_core),
            metal: self.metal.or(base.metal),
            disk_size: self.disk_size.or(base.disk_size),
            cycle_time: self.cycle_time.or(base.cycle_time),
            imageset: self.imageset.or(base.imageset),
            container: self.container.or(base.container),
            command: self.command.or(base.command),
            macros,
            scopes,
        }
    }

    /// Flatten the parent chain of pool `name` into a single definition
    ///
    /// `load` returns the raw definition of a pool by name. Parents are
    /// applied in the order they are listed, so a later parent overrides an
    /// earlier one, and the pool itself overrides all of them. The result has
    /// no parents left.
    ///
    /// # Errors
    /// Any error from `load`, or [`PoolError::ParentCycle`] when a pool is
    /// its own ancestor.
    pub fn resolve<F, E>(name: &str, mut load: F) -> std::result::Result<PoolConfigInput, E>
    where
        F: FnMut(&str) -> std::result::Result<PoolConfigInput, E>,
        E: From<PoolError>,
    {
        let mut chain = Vec::new();
        let mut resolved = resolve_chain(name, &mut load, &mut chain)?;
        resolved.parents.clear();
        Ok(resolved)
    }
}

fn resolve_chain<F, E>(
    name: &str,
    load: &mut F,
    chain: &mut Vec<String>,
) -> std::result::Result<PoolConfigInput, E>
where
    F: FnMut(&str) -> std::result::Result<PoolConfigInput, E>,
    E: From<PoolError>,
{
    if chain.iter().any(|ancestor| ancestor == name) {
        return Err(PoolError::ParentCycle(name.to_string()).into());
    }
    chain.push(name.to_string());

    let pool = load(name)?;
    let mut base = PoolConfigInput::default();
    for parent in &pool.parents {
        debug!(pool = name, parent = parent.as_str(), "Resolving parent");
        base = resolve_chain(parent, load, chain)?.inherit(base);
    }

    chain.pop();
    Ok(pool.inherit(base))
}

/// Validated fuzzing pool
///
/// Built once from a flat [`PoolConfigInput`] and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolConfiguration {
    /// Name of the pool file, without extension
    pub pool_name: String,
    /// `{platform}-{pool_name}`, used for worker type, hook and role ids
    pub id: String,
    /// Pool file name handed to the decision task
    pub filename: String,
    /// Descriptive name
    pub name: String,
    pub cloud: String,
    pub platform: Platform,
    pub cpu: String,
    pub tasks: u32,
    pub cores_per_task: u32,
    /// GB
    pub minimum_memory_per_core: f64,
    pub metal: bool,
    /// GB
    pub disk_size: u64,
    /// Seconds
    pub cycle_time: u64,
    pub imageset: String,
    pub container: String,
    pub command: Vec<String>,
    pub macros: EnvVars,
    pub scopes: Vec<String>,
}

impl PoolConfiguration {
    /// Validate a resolved pool definition
    ///
    /// # Errors
    /// [`PoolError::MissingField`] or [`PoolError::InvalidField`] naming the
    /// pool and the offending field, or a unit error from a size/duration.
    pub fn new(pool_name: &str, input: PoolConfigInput) -> Result<Self> {
        let missing = |field: &'static str| PoolError::MissingField {
            pool: pool_name.to_string(),
            field,
        };

        if !input.parents.is_empty() {
            return Err(PoolError::invalid(
                pool_name,
                "parents",
                "parents must be resolved before validation",
            ));
        }

        let name = required_text(pool_name, "name", input.name)?;
        let cloud = required_text(pool_name, "cloud", input.cloud)?;
        let cpu = required_text(pool_name, "cpu", input.cpu)?;
        let imageset = required_text(pool_name, "imageset", input.imageset)?;
        let container = required_text(pool_name, "container", input.container)?;

        let platform = match required_text(pool_name, "platform", input.platform)?.as_str() {
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => {
                return Err(PoolError::invalid(
                    pool_name,
                    "platform",
                    format!("unsupported platform {:?}", other),
                ));
            }
        };

        let tasks = positive(pool_name, "tasks", input.tasks.ok_or_else(|| missing("tasks"))?)?;
        let cores_per_task = positive(
            pool_name,
            "cores_per_task",
            input.cores_per_task.ok_or_else(|| missing("cores_per_task"))?,
        )?;

        let minimum_memory_per_core = input
            .minimum_memory_per_core
            .ok_or_else(|| missing("minimum_memory_per_core"))?
            .to_size(1)? as f64
            / GIB as f64;

        let disk_size = input
            .disk_size
            .ok_or_else(|| missing("disk_size"))?
            .to_size(GIB)?;
        if disk_size == 0 {
            return Err(PoolError::invalid(pool_name, "disk_size", "must be at least 1g"));
        }

        let cycle_time = input
            .cycle_time
            .ok_or_else(|| missing("cycle_time"))?
            .to_seconds()?;
        if cycle_time == 0 {
            return Err(PoolError::invalid(pool_name, "cycle_time", "must be at least 1s"));
        }
        if cycle_time > MAX_CYCLE_TIME {
            return Err(PoolError::invalid(
                pool_name,
                "cycle_time",
                format!("must be at most {}s, got {}s", MAX_CYCLE_TIME, cycle_time),
            ));
        }

        if input.macros.contains_key(POOL_ENV_KEY) {
            return Err(PoolError::invalid(
                pool_name,
                "macros",
                format!("{} is reserved", POOL_ENV_KEY),
            ));
        }

        Ok(Self {
            pool_name: pool_name.to_string(),
            id: format!("{}-{}", platform, pool_name),
            filename: format!("{}.yml", pool_name),
            name,
            cloud,
            platform,
            cpu,
            tasks,
            cores_per_task,
            minimum_memory_per_core,
            metal: input.metal.unwrap_or(false),
            disk_size,
            cycle_time,
            imageset,
            container,
            command: input.command.map(CommandLine::into_args).unwrap_or_default(),
            macros: input.macros,
            scopes: input.scopes,
        })
    }

    /// Machines this pool may run on, in catalog order
    ///
    /// An empty list is not an error here; see [`Self::build_resources`].
    pub fn machine_list(&self, catalog: &MachineCatalog) -> Result<Vec<MachineCandidate>> {
        let candidates: Vec<MachineCandidate> = catalog
            .filter(
                &self.cloud,
                &self.cpu,
                self.cores_per_task,
                self.minimum_memory_per_core,
                self.metal,
            )?
            .map(|machine| MachineCandidate {
                capacity_per_instance: machine.cores / self.cores_per_task,
                machine: machine.clone(),
            })
            .collect();

        debug!(
            pool = self.id.as_str(),
            candidates = candidates.len(),
            "Selected machine types"
        );
        Ok(candidates)
    }
}

fn required_text(pool: &str, field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(PoolError::invalid(pool, field, "must not be empty")),
        None => Err(PoolError::MissingField {
            pool: pool.to_string(),
            field,
        }),
    }
}

fn positive(pool: &str, field: &'static str, value: i64) -> Result<u32> {
    if value < 1 {
        return Err(PoolError::invalid(pool, field, format!("must be at least 1, got {}", value)));
    }
    u32::try_from(value).map_err(|_| PoolError::invalid(pool, field, "value too large"))
}

/// Merge `extra` into `env`, refusing to overwrite any existing key
pub(crate) fn merge_env(env: &mut EnvVars, extra: Option<&EnvVars>) -> Result<()> {
    let Some(extra) = extra else {
        return Ok(());
    };

    let conflicts: Vec<String> = extra
        .keys()
        .filter(|key| env.contains_key(*key))
        .cloned()
        .collect();
    if !conflicts.is_empty() {
        return Err(PoolError::EnvConflict { keys: conflicts });
    }

    env.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(())
}
