//! Taskcluster HTTP Client
//!
//! A thin client for the two Taskcluster services the decision task talks
//! to: the queue (task creation) and the secrets service (settings).
//!
//! Inside a task the client is pointed at the taskcluster proxy, which signs
//! requests with the task's own credentials, so no authentication happens
//! here.
//!
//! # Example
//!
//! ```no_run
//! use fuzzing_client::TaskclusterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fuzzing_client::ClientError> {
//!     let client = TaskclusterClient::new("http://taskcluster");
//!     let settings = client.get_secret("project/fuzzing/decision").await?;
//!     println!("{}", settings);
//!     Ok(())
//! }
//! ```

pub mod error;
mod queue;
mod secrets;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use queue::TaskStatus;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// HTTP client for the Taskcluster REST APIs
#[derive(Debug, Clone)]
pub struct TaskclusterClient {
    /// Root URL of the deployment or proxy (e.g., "http://taskcluster")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl TaskclusterClient {
    /// Create a new Taskcluster client
    ///
    /// # Arguments
    /// * `base_url` - Root URL, services live under `{base_url}/api/...`
    ///
    /// # Example
    /// ```
    /// use fuzzing_client::TaskclusterClient;
    ///
    /// let client = TaskclusterClient::new("http://taskcluster");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new Taskcluster client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, service: &str, path: &str) -> String {
        format!("{}/api/{}/v1/{}", self.base_url, service, path)
    }

    /// Decode a JSON response, turning error statuses into [`ClientError::Status`]
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))
    }
}

/// Taskcluster error body
#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: String,
}

fn status_error(status: u16, body: String) -> ClientError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(error) => ClientError::status(status, error.code, error.message),
        Err(_) => ClientError::status(status, None, body),
    }
}
