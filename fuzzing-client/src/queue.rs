//! Queue API endpoints

use fuzzing_core::dto::task::TaskDefinition;
use serde::Deserialize;
use tracing::debug;

use crate::TaskclusterClient;
use crate::error::Result;

/// Status returned by the queue for a created task
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Deserialize)]
struct TaskStatusResponse {
    status: TaskStatus,
}

impl TaskclusterClient {
    // =============================================================================
    // Task Creation
    // =============================================================================

    /// Create a task under a caller-chosen id
    ///
    /// # Arguments
    /// * `task_id` - Slug id for the new task
    /// * `task` - The task definition
    ///
    /// # Returns
    /// The queue's view of the new task
    ///
    /// # Errors
    /// [`crate::ClientError::Status`] when the queue rejects the definition,
    /// e.g. on missing scopes or an id reused with a different definition.
    pub async fn create_task(&self, task_id: &str, task: &TaskDefinition) -> Result<TaskStatus> {
        let url = self.url("queue", &format!("task/{}", task_id));
        debug!(task_id, "Creating task");
        let response = self.client.put(&url).json(task).send().await?;

        let body: TaskStatusResponse = self.handle_response(response).await?;
        Ok(body.status)
    }
}
