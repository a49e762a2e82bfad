//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod resources;
mod tasks;

#[cfg(test)]
mod fixtures;

pub use resources::ResourcesArgs;
pub use tasks::TasksArgs;

use anyhow::Result;
use clap::Subcommand;
use fuzzing_core::EnvVars;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create the fuzzing tasks of one pool
    Tasks(TasksArgs),
    /// Print the worker pool, hook and role of every pool
    Resources(ResourcesArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Tasks(args) => tasks::handle_tasks_command(args, config).await,
        Commands::Resources(args) => resources::handle_resources_command(args, config).await,
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Collect `--env` pairs, `None` when there are none
fn collect_env(pairs: Vec<(String, String)>) -> Option<EnvVars> {
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.into_iter().collect())
    }
}
