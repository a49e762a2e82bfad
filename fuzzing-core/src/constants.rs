//! Deployment-wide identifiers
//!
//! These values are shared by every pool and must match the Taskcluster
//! deployment the generated resources are applied to.

/// Scheduler id used by every generated task
pub const SCHEDULER_ID: &str = "-";

/// Provisioner hosting the fuzzing worker pools
pub const PROVISIONER_ID: &str = "proj-fuzzing";

/// Prefix of every generated worker pool id
pub const WORKER_POOL_PREFIX: &str = "proj-fuzzing";

/// Hook group holding the decision hooks
pub const HOOK_PREFIX: &str = "project-fuzzing";

pub const OWNER_EMAIL: &str = "fuzzing+taskcluster@mozilla.com";

/// Secret read by the decision task to load its settings
pub const DECISION_TASK_SECRET: &str = "project/fuzzing/decision";

pub const SOURCE_URL: &str = "https://github.com/MozillaSecurity/fuzzing-tc";

/// Description shared by generated pools, roles and tasks
pub const DESCRIPTION: &str = "*DO NOT EDIT* - This resource is configured automatically.\n\nFuzzing workers generated by decision task";

pub const HOOK_DESCRIPTION: &str = "*DO NOT EDIT* - This resource is configured automatically.\n\nGenerated Fuzzing hook";

/// Environment key carrying the pool filename into fuzzing tasks
pub const POOL_ENV_KEY: &str = "TASKCLUSTER_FUZZING_POOL";

/// Environment key carrying the settings secret into the decision task
pub const SECRET_ENV_KEY: &str = "TASKCLUSTER_SECRET";

/// Indexed docker image running the decision task
pub const DECISION_IMAGE_PATH: &str = "public/fuzzing-tc-decision.tar";
pub const DECISION_IMAGE_NAMESPACE: &str = "project.fuzzing.config.master";

/// Decision task max run time and deadline, in seconds
pub const DECISION_MAX_RUN_TIME: u64 = 3600;

/// Private log artifact attached to each fuzzing task
pub const LOG_ARTIFACT: &str = "project/fuzzing/private/logs";

/// Worker manager provider ids
pub const AWS_PROVIDER_ID: &str = "community-tc-workers-aws";
pub const GCP_PROVIDER_ID: &str = "community-tc-workers-google";

/// Upper bound on a pool's cycle time, in seconds
///
/// The queue refuses task deadlines more than five days after creation.
pub const MAX_CYCLE_TIME: u64 = 5 * 24 * 60 * 60;
