//! Tasks command
//!
//! Runs inside the decision task: builds the fuzzing tasks of one pool and
//! creates them in the queue as dependents of the decision task.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use colored::*;
use fuzzing_client::TaskclusterClient;
use fuzzing_core::dto::task::TaskDefinition;
use fuzzing_core::{SlugIds, SystemClock};
use tracing::info;

use super::{collect_env, parse_key_val};
use crate::config::Config;

#[derive(Args)]
pub struct TasksArgs {
    /// Pool name, or pool file name (e.g., linux-pool or linux-pool.yml)
    pub pool: String,

    /// Id of the running decision task
    #[arg(long, env = "TASK_ID")]
    pub task_id: String,

    /// Print the tasks as JSON lines instead of creating them
    #[arg(long)]
    pub dry_run: bool,

    /// Extra environment for the fuzzing tasks (e.g., --env KEY=value)
    #[arg(short, long, value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,
}

/// Destination of generated tasks
#[async_trait]
pub trait TaskSink: Send + Sync {
    /// Submits one task under its id
    async fn submit(&self, task_id: &str, task: &TaskDefinition) -> Result<()>;
}

/// Creates tasks through the queue API
pub struct QueueSink {
    client: TaskclusterClient,
}

impl QueueSink {
    pub fn new(client: TaskclusterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskSink for QueueSink {
    async fn submit(&self, task_id: &str, task: &TaskDefinition) -> Result<()> {
        let status = self.client.create_task(task_id, task).await.map_err(|e| {
            let context = if e.is_client_error() {
                format!("Queue rejected task {}", task_id)
            } else if e.is_unavailable() {
                format!("Queue unavailable while creating task {}", task_id)
            } else {
                format!("Failed to create task {}", task_id)
            };
            anyhow::Error::new(e).context(context)
        })?;
        info!(
            "Created task {} ({})",
            status.task_id,
            status.state.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}

/// Prints tasks to stdout, one JSON object per line
pub struct StdoutSink;

#[async_trait]
impl TaskSink for StdoutSink {
    async fn submit(&self, task_id: &str, task: &TaskDefinition) -> Result<()> {
        let line = serde_json::json!({ "taskId": task_id, "task": task });
        println!("{}", serde_json::to_string(&line)?);
        Ok(())
    }
}

/// Submit every task in order, stopping at the first failure
///
/// # Returns
/// The number of submitted tasks
pub async fn submit_tasks<I>(tasks: I, sink: &dyn TaskSink) -> Result<usize>
where
    I: IntoIterator<Item = (String, TaskDefinition)>,
{
    let mut count = 0;
    for (task_id, task) in tasks {
        sink.submit(&task_id, &task).await?;
        count += 1;
    }
    Ok(count)
}

/// Handle the tasks command
pub async fn handle_tasks_command(args: TasksArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let settings = config.load_settings(&client).await?;

    let name = args.pool.strip_suffix(".yml").unwrap_or(&args.pool);
    let pool = settings
        .pools()
        .load(name)
        .with_context(|| format!("Failed to load pool {}", name))?;
    info!("Building {} tasks for pool {}", pool.tasks, pool.id);

    let env = collect_env(args.env);
    let batch = pool
        .build_tasks(&args.task_id, env.as_ref(), &SystemClock, &SlugIds)
        .with_context(|| format!("Failed to build tasks for pool {}", pool.id))?;

    let sink: Box<dyn TaskSink> = if args.dry_run {
        Box::new(StdoutSink)
    } else {
        Box::new(QueueSink::new(client))
    };
    let count = submit_tasks(batch, sink.as_ref()).await?;

    let verb = if args.dry_run { "Generated" } else { "Created" };
    eprintln!(
        "{} {} {} task(s) for {}",
        "✓".green().bold(),
        verb,
        count,
        pool.id.cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::config_tree;
    use fuzzing_core::{EnvVars, SequentialIds};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingSink {
        submitted: Mutex<Vec<(String, TaskDefinition)>>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl TaskSink for RecordingSink {
        async fn submit(&self, task_id: &str, task: &TaskDefinition) -> Result<()> {
            let mut submitted = self.submitted.lock().unwrap();
            if Some(submitted.len()) == self.fail_after {
                anyhow::bail!("queue unavailable");
            }
            submitted.push((task_id.to_string(), task.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submit_pool_tasks() {
        let (_dir, config) = config_tree();
        let settings = config.load_settings(&config.client()).await.unwrap();
        let pool = settings.pools().load("test").unwrap();

        let ids = SequentialIds::new("task-");
        let env = EnvVars::from([("EXTRA".to_string(), "1".to_string())]);
        let batch = pool
            .build_tasks("decision", Some(&env), &SystemClock, &ids)
            .unwrap();

        let sink = RecordingSink::default();
        assert_eq!(submit_tasks(batch, &sink).await.unwrap(), 3);

        let submitted = sink.submitted.into_inner().unwrap();
        let ids: Vec<&str> = submitted.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["task-1", "task-2", "task-3"]);
        for (_, task) in &submitted {
            assert_eq!(task.worker_type, "linux-test");
            assert_eq!(task.dependencies, vec!["decision"]);
            assert_eq!(task.payload.env["EXTRA"], "1");
            assert_eq!(task.payload.env["TASKCLUSTER_FUZZING_POOL"], "test.yml");
            assert_eq!(task.scopes, vec!["secrets:get:project/fuzzing/token"]);
        }
    }

    #[tokio::test]
    async fn test_submit_stops_on_failure() {
        let (_dir, config) = config_tree();
        let settings = config.load_settings(&config.client()).await.unwrap();
        let pool = settings.pools().load("test").unwrap();
        let ids = SequentialIds::new("task-");
        let batch = pool
            .build_tasks("decision", None, &SystemClock, &ids)
            .unwrap();

        let sink = RecordingSink {
            fail_after: Some(1),
            ..Default::default()
        };
        let err = submit_tasks(batch, &sink).await.unwrap_err();
        assert!(err.to_string().contains("queue unavailable"));
        assert_eq!(sink.submitted.into_inner().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_command() {
        let (_dir, config) = config_tree();
        let args = TasksArgs {
            pool: "test".to_string(),
            task_id: "decision".to_string(),
            dry_run: true,
            env: Vec::new(),
        };
        handle_tasks_command(args, &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_pool_file_name() {
        let (_dir, config) = config_tree();
        let args = TasksArgs {
            pool: "test.yml".to_string(),
            task_id: "decision".to_string(),
            dry_run: true,
            env: vec![("EXTRA".to_string(), "1".to_string())],
        };
        handle_tasks_command(args, &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_pool() {
        let (_dir, config) = config_tree();
        let args = TasksArgs {
            pool: "missing".to_string(),
            task_id: "decision".to_string(),
            dry_run: true,
            env: Vec::new(),
        };
        let err = handle_tasks_command(args, &config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load pool missing"));
    }

    async fn first_task() -> (tempfile::TempDir, TaskDefinition) {
        let (dir, config) = config_tree();
        let settings = config.load_settings(&config.client()).await.unwrap();
        let pool = settings.pools().load("test").unwrap();
        let ids = SequentialIds::new("task-");
        let (_, task) = pool
            .build_tasks("decision", None, &SystemClock, &ids)
            .unwrap()
            .next()
            .unwrap();
        (dir, task)
    }

    #[tokio::test]
    async fn test_queue_sink_creates_task() {
        let (_dir, task) = first_task().await;
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/queue/v1/task/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": {"taskId": "task-1", "state": "unscheduled"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = QueueSink::new(TaskclusterClient::new(mock_server.uri()));
        sink.submit("task-1", &task).await.unwrap();
    }

    #[tokio::test]
    async fn test_queue_sink_rejected_task() {
        let (_dir, task) = first_task().await;
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": "InputValidationError",
                "message": "data/deadline must be before expires",
            })))
            .mount(&mock_server)
            .await;

        let sink = QueueSink::new(TaskclusterClient::new(mock_server.uri()));
        let err = sink.submit("task-1", &task).await.unwrap_err();
        assert_eq!(err.to_string(), "Queue rejected task task-1");
        assert!(format!("{:#}", err).contains("deadline must be before expires"));
    }

    #[tokio::test]
    async fn test_queue_sink_unavailable() {
        let (_dir, task) = first_task().await;
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let sink = QueueSink::new(TaskclusterClient::new(mock_server.uri()));
        let err = sink.submit("task-1", &task).await.unwrap_err();
        assert_eq!(err.to_string(), "Queue unavailable while creating task task-1");
    }
}
