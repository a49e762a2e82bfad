//! Task definitions

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::JsonMap;
use crate::domain::pool::EnvVars;

/// Task timestamp: absolute, or relative to hook firing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// JSON-e `$fromNow` expression, evaluated when the hook fires
    Relative {
        #[serde(rename = "$fromNow")]
        from_now: String,
    },
    /// `YYYY-MM-DDTHH:MM:SS.mmmZ`
    Absolute(String),
}

impl Timestamp {
    pub fn from_now(expr: impl Into<String>) -> Self {
        Timestamp::Relative {
            from_now: expr.into(),
        }
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Timestamp::Absolute(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Task definition accepted by the queue's `createTask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    pub created: Timestamp,
    pub deadline: Timestamp,
    pub expires: Timestamp,
    pub extra: JsonMap,
    pub metadata: TaskMetadata,
    pub payload: TaskPayload,
    pub priority: String,
    pub provisioner_id: String,
    pub worker_type: String,
    pub retries: u32,
    pub routes: Vec<String>,
    pub scheduler_id: String,
    pub scopes: Vec<String>,
    pub tags: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub description: String,
    pub name: String,
    pub owner: String,
    pub source: String,
}

/// docker-worker payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub artifacts: BTreeMap<String, Artifact>,
    pub cache: JsonMap,
    pub capabilities: JsonMap,
    pub env: EnvVars,
    pub features: Features,
    pub image: TaskImage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    pub max_run_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(rename = "taskclusterProxy")]
    pub taskcluster_proxy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub expires: Timestamp,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Docker image, either a plain reference or an indexed task artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskImage {
    Indexed {
        #[serde(rename = "type")]
        kind: String,
        path: String,
        namespace: String,
    },
    Named(String),
}
