//! Records handed to Taskcluster
//!
//! This module contains the serialisable worker-pool, hook, role and task
//! definitions. Field names follow the Taskcluster JSON schemas exactly.

pub mod resource;
pub mod task;

/// Free-form JSON object (`extra`, `tags`, `cache`, ...)
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
