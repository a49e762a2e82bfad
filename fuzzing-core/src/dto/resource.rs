//! Worker pool, hook and role resources

use serde::{Deserialize, Serialize};

use super::JsonMap;
use super::task::TaskDefinition;

/// A Taskcluster resource, tagged with its `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    WorkerPool(WorkerPool),
    Hook(Hook),
    Role(Role),
}

impl Resource {
    /// Identifier in the `Kind=id` form used by resource management tools
    pub fn id(&self) -> String {
        match self {
            Resource::WorkerPool(pool) => format!("WorkerPool={}", pool.worker_pool_id),
            Resource::Hook(hook) => format!("Hook={}/{}", hook.hook_group_id, hook.hook_id),
            Resource::Role(role) => format!("Role={}", role.role_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPool {
    pub worker_pool_id: String,
    pub provider_id: String,
    pub description: String,
    pub owner: String,
    pub email_on_error: bool,
    pub config: WorkerPoolConfig,
}

/// Worker manager capacity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPoolConfig {
    pub min_capacity: u32,
    pub max_capacity: u32,
    /// Provider-specific launch configurations, passed through verbatim
    pub launch_configs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub hook_group_id: String,
    pub hook_id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub email_on_error: bool,
    pub schedule: Vec<String>,
    pub task: TaskDefinition,
    pub bindings: Vec<serde_json::Value>,
    pub trigger_schema: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: String,
    pub description: String,
    pub scopes: Vec<String>,
}
