//! Fuzzing Decision
//!
//! Command-line entry point of the fuzzing decision task.
//!
//! - `tasks <pool>`: build the fuzzing tasks of one pool and submit them to
//!   the queue, as children of the running decision task
//! - `resources`: build the worker pool, hook and role of every pool and
//!   print them as JSON for the synchronisation tool
//!
//! Logs go to stderr; stdout only carries generated JSON.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fuzzing-decision")]
#[command(about = "Fuzzing pool decision task for Taskcluster", long_about = None)]
struct Cli {
    /// Local settings file (YAML or JSON)
    #[arg(long, global = true)]
    configuration: Option<PathBuf>,

    /// Taskcluster secret holding the settings
    #[arg(long, global = true, env = "TASKCLUSTER_SECRET")]
    taskcluster_secret: Option<String>,

    /// Taskcluster root URL
    #[arg(
        long,
        global = true,
        env = "TASKCLUSTER_PROXY_URL",
        default_value = "http://taskcluster"
    )]
    taskcluster_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fuzzing_decision=info,fuzzing_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_from(hook_invocation(std::env::args_os()));

    let config = Config {
        configuration: cli.configuration,
        taskcluster_secret: cli.taskcluster_secret,
        taskcluster_url: cli.taskcluster_url,
    };

    handle_command(cli.command, &config).await
}

/// Map the hook form `fuzzing-decision <pool>.yml` onto the tasks command
fn hook_invocation(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    let is_pool_file = args
        .get(1)
        .and_then(|arg| arg.to_str())
        .is_some_and(|arg| arg.ends_with(".yml"));
    if is_pool_file {
        args.insert(1, OsString::from("tasks"));
    }
    args
}
