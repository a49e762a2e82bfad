//! Fuzzing task generation

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;
use std::iter::FusedIterator;
use tracing::debug;

use super::{EnvVars, PoolConfiguration, merge_env};
use crate::clock::{Clock, IdGenerator};
use crate::constants::{
    DESCRIPTION, LOG_ARTIFACT, OWNER_EMAIL, POOL_ENV_KEY, PROVISIONER_ID, SCHEDULER_ID, SOURCE_URL,
};
use crate::dto::JsonMap;
use crate::dto::task::{
    Artifact, Features, TaskDefinition, TaskImage, TaskMetadata, TaskPayload, Timestamp,
};
use crate::error::{PoolError, Result};

/// Taskcluster's "1 month"
const TASK_EXPIRY_DAYS: i64 = 30;

impl PoolConfiguration {
    /// Create the fuzzing tasks for one decision run
    ///
    /// All tasks share the same creation time, read once from `clock`, and
    /// depend on the decision task `parent_task_id`. The environment is
    /// checked before any task is produced.
    ///
    /// # Errors
    /// [`PoolError::EnvConflict`] when `env` redefines the pool filename
    /// variable or one of the pool macros, [`PoolError::InvalidField`] when
    /// the deadline or expiry falls outside the representable time range.
    pub fn build_tasks<'a>(
        &'a self,
        parent_task_id: &str,
        env: Option<&EnvVars>,
        clock: &dyn Clock,
        ids: &'a dyn IdGenerator,
    ) -> Result<TaskBatch<'a>> {
        let mut task_env = self.macros.clone();
        task_env.insert(POOL_ENV_KEY.to_string(), self.filename.clone());
        merge_env(&mut task_env, env)?;

        let now = clock.now();
        let deadline = i64::try_from(self.cycle_time)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|cycle| now.checked_add_signed(cycle))
            .ok_or_else(|| {
                PoolError::invalid(&self.pool_name, "cycle_time", "deadline out of range")
            })?;
        let expires = TimeDelta::try_days(TASK_EXPIRY_DAYS)
            .and_then(|expiry| now.checked_add_signed(expiry))
            .ok_or_else(|| PoolError::invalid(&self.pool_name, "expires", "expiry out of range"))?;

        debug!(
            pool = self.id.as_str(),
            parent = parent_task_id,
            tasks = self.tasks,
            "Building fuzzing tasks"
        );

        Ok(TaskBatch {
            pool: self,
            ids,
            parent_task_id: parent_task_id.to_string(),
            env: task_env,
            now,
            deadline,
            expires,
            next: 1,
        })
    }
}

/// Lazily generated fuzzing tasks, yielding `(task_id, task)` pairs
pub struct TaskBatch<'a> {
    pool: &'a PoolConfiguration,
    ids: &'a dyn IdGenerator,
    parent_task_id: String,
    env: EnvVars,
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
    expires: DateTime<Utc>,
    /// 1-based index of the next task, kept wide so it can pass `u32::MAX`
    next: u64,
}

impl TaskBatch<'_> {
    fn remaining(&self) -> u64 {
        (u64::from(self.pool.tasks) + 1).saturating_sub(self.next)
    }

    fn task(&self, index: u64) -> TaskDefinition {
        let pool = self.pool;
        let expires = Timestamp::at(self.expires);

        let artifacts = BTreeMap::from([(
            LOG_ARTIFACT.to_string(),
            Artifact {
                expires: expires.clone(),
                path: "/logs/".to_string(),
                kind: "directory".to_string(),
            },
        )]);

        TaskDefinition {
            task_group_id: Some(self.parent_task_id.clone()),
            dependencies: vec![self.parent_task_id.clone()],
            created: Timestamp::at(self.now),
            deadline: Timestamp::at(self.deadline),
            expires,
            extra: JsonMap::new(),
            metadata: TaskMetadata {
                description: DESCRIPTION.to_string(),
                name: format!("Fuzzing task {} - {}/{}", pool.id, index, pool.tasks),
                owner: OWNER_EMAIL.to_string(),
                source: SOURCE_URL.to_string(),
            },
            payload: TaskPayload {
                artifacts,
                cache: JsonMap::new(),
                capabilities: JsonMap::new(),
                env: self.env.clone(),
                features: Features {
                    taskcluster_proxy: true,
                },
                image: TaskImage::Named(pool.container.clone()),
                command: pool.command.clone(),
                max_run_time: pool.cycle_time,
            },
            priority: "high".to_string(),
            provisioner_id: PROVISIONER_ID.to_string(),
            worker_type: pool.id.clone(),
            retries: 1,
            routes: Vec::new(),
            scheduler_id: SCHEDULER_ID.to_string(),
            scopes: pool.scopes.clone(),
            tags: JsonMap::new(),
        }
    }
}

impl Iterator for TaskBatch<'_> {
    type Item = (String, TaskDefinition);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some((self.ids.next_id(), self.task(index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TaskBatch<'_> {}

impl FusedIterator for TaskBatch<'_> {}
