//! Worker pool, hook and role generation

use std::collections::BTreeSet;
use tracing::info;

use super::{EnvVars, PoolConfiguration, merge_env};
use crate::constants::{
    DECISION_IMAGE_NAMESPACE, DECISION_IMAGE_PATH, DECISION_MAX_RUN_TIME, DECISION_TASK_SECRET,
    DESCRIPTION, HOOK_DESCRIPTION, HOOK_PREFIX, OWNER_EMAIL, PROVISIONER_ID, SCHEDULER_ID,
    SECRET_ENV_KEY, SOURCE_URL, WORKER_POOL_PREFIX,
};
use crate::domain::machine::MachineCatalog;
use crate::dto::JsonMap;
use crate::dto::resource::{Hook, Resource, Role, WorkerPool, WorkerPoolConfig};
use crate::dto::task::{Features, TaskDefinition, TaskImage, TaskMetadata, TaskPayload, Timestamp};
use crate::error::{PoolError, Result};
use crate::provider::ProviderRegistry;

impl PoolConfiguration {
    /// Scopes the decision task needs to schedule this pool's tasks
    pub fn decision_task_scopes(&self) -> [String; 3] {
        [
            format!("queue:scheduler-id:{}", SCHEDULER_ID),
            format!("queue:create-task:highest:{}/{}", PROVISIONER_ID, self.id),
            format!("secrets:get:{}", DECISION_TASK_SECRET),
        ]
    }

    /// Build the worker pool, hook and role for this pool
    ///
    /// # Arguments
    /// * `providers` - Launch config builders keyed by cloud name
    /// * `machines` - Machine catalog to select instance types from
    /// * `env` - Extra environment for the decision task
    ///
    /// # Returns
    /// The resources in the order `[worker pool, hook, role]`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The pool's cloud is not registered
    /// - The catalog has no entry for the pool's cloud or architecture
    /// - No machine satisfies the pool's requirements
    /// - The provider has no region or zone to launch the machines in
    /// - The provider cannot build launch configs for the imageset
    /// - `env` redefines a decision task environment variable
    pub fn build_resources(
        &self,
        providers: &ProviderRegistry,
        machines: &MachineCatalog,
        env: Option<&EnvVars>,
    ) -> Result<[Resource; 3]> {
        let provider = providers
            .get(&self.cloud)
            .ok_or_else(|| PoolError::ProviderUnavailable(self.cloud.clone()))?;

        let candidates = self.machine_list(machines)?;
        if candidates.is_empty() {
            return Err(PoolError::NoMachines(self.id.clone()));
        }

        let launch_configs =
            provider.build_launch_configs(&self.imageset, &candidates, self.disk_size)?;
        if launch_configs.is_empty() {
            return Err(PoolError::NoLaunchConfigs(self.id.clone()));
        }

        let config = WorkerPoolConfig {
            min_capacity: 0,
            max_capacity: self.tasks,
            launch_configs,
        };

        let decision_task_scopes = self.decision_task_scopes();
        let decision_task = self.decision_task(&decision_task_scopes, env)?;

        let pool = WorkerPool {
            worker_pool_id: format!("{}/{}", WORKER_POOL_PREFIX, self.id),
            provider_id: provider.provider_id().to_string(),
            description: DESCRIPTION.to_string(),
            owner: OWNER_EMAIL.to_string(),
            email_on_error: true,
            config,
        };

        let hook = Hook {
            hook_group_id: HOOK_PREFIX.to_string(),
            hook_id: self.id.clone(),
            name: self.name.clone(),
            description: HOOK_DESCRIPTION.to_string(),
            owner: OWNER_EMAIL.to_string(),
            email_on_error: true,
            schedule: Vec::new(),
            task: decision_task,
            bindings: Vec::new(),
            trigger_schema: JsonMap::new(),
        };

        let scopes: BTreeSet<String> = self
            .scopes
            .iter()
            .cloned()
            .chain(decision_task_scopes)
            .collect();
        let role = Role {
            role_id: format!("hook-id:{}/{}", HOOK_PREFIX, self.id),
            description: DESCRIPTION.to_string(),
            scopes: scopes.into_iter().collect(),
        };

        info!(
            pool = self.id.as_str(),
            launch_configs = pool.config.launch_configs.len(),
            "Built pool resources"
        );

        Ok([
            Resource::WorkerPool(pool),
            Resource::Hook(hook),
            Resource::Role(role),
        ])
    }

    /// Task fired by the hook, regenerating this pool's fuzzing tasks
    fn decision_task(&self, scopes: &[String], env: Option<&EnvVars>) -> Result<TaskDefinition> {
        let mut task_env =
            EnvVars::from([(SECRET_ENV_KEY.to_string(), DECISION_TASK_SECRET.to_string())]);
        merge_env(&mut task_env, env)?;

        Ok(TaskDefinition {
            task_group_id: None,
            dependencies: Vec::new(),
            created: Timestamp::from_now("0 seconds"),
            deadline: Timestamp::from_now(format!("{} seconds", DECISION_MAX_RUN_TIME)),
            expires: Timestamp::from_now("1 month"),
            extra: JsonMap::new(),
            metadata: TaskMetadata {
                description: DESCRIPTION.to_string(),
                name: format!("Fuzzing decision {}", self.id),
                owner: OWNER_EMAIL.to_string(),
                source: SOURCE_URL.to_string(),
            },
            payload: TaskPayload {
                artifacts: Default::default(),
                cache: JsonMap::new(),
                capabilities: JsonMap::new(),
                env: task_env,
                features: Features {
                    taskcluster_proxy: true,
                },
                image: TaskImage::Indexed {
                    kind: "indexed-image".to_string(),
                    path: DECISION_IMAGE_PATH.to_string(),
                    namespace: DECISION_IMAGE_NAMESPACE.to_string(),
                },
                command: vec!["fuzzing-decision".to_string(), self.filename.clone()],
                max_run_time: DECISION_MAX_RUN_TIME,
            },
            priority: "high".to_string(),
            provisioner_id: PROVISIONER_ID.to_string(),
            worker_type: self.id.clone(),
            retries: 1,
            routes: Vec::new(),
            scheduler_id: SCHEDULER_ID.to_string(),
            scopes: scopes.to_vec(),
            tags: JsonMap::new(),
        })
    }
}
