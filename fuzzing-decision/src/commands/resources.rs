//! Resources command
//!
//! Builds the worker pool, hook and role of every configured pool and prints
//! them as one JSON array on stdout.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use fuzzing_config::{Settings, load_machine_catalog};
use fuzzing_core::EnvVars;
use fuzzing_core::dto::resource::Resource;
use tracing::info;

use super::{collect_env, parse_key_val};
use crate::config::Config;

#[derive(Args)]
pub struct ResourcesArgs {
    /// Extra environment for the hook decision tasks (e.g., --env KEY=value)
    #[arg(short, long, value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,
}

/// Build the resources of every pool, in pool name order
///
/// Stops at the first pool that fails to build.
pub fn build_all_resources(settings: &Settings, env: Option<&EnvVars>) -> Result<Vec<Resource>> {
    let machines_path = settings.machines_path();
    let machines = load_machine_catalog(&machines_path)
        .with_context(|| format!("Failed to load machines from {}", machines_path.display()))?;
    let community = settings
        .community()
        .context("Failed to load community configuration")?;
    let providers = community.providers();

    let pools = settings.pools().load_all()?;
    info!("Building resources for {} pool(s)", pools.len());

    let mut resources = Vec::with_capacity(pools.len() * 3);
    for pool in &pools {
        let built = pool
            .build_resources(&providers, &machines, env)
            .with_context(|| format!("Failed to build resources for pool {}", pool.id))?;
        resources.extend(built);
    }
    Ok(resources)
}

/// Handle the resources command
pub async fn handle_resources_command(args: ResourcesArgs, config: &Config) -> Result<()> {
    let settings = config.load_settings(&config.client()).await?;
    let env = collect_env(args.env);

    let resources = build_all_resources(&settings, env.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&resources)?);

    eprintln!(
        "{} {}",
        "✓".green().bold(),
        format!("Generated {} resource(s)", resources.len()).bold()
    );
    for resource in &resources {
        eprintln!("  {} {}", "▸".cyan(), resource.id().dimmed());
    }
    Ok(())
}
