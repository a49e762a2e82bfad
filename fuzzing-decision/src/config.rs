//! Configuration module
//!
//! Global CLI settings and decision settings lookup.

use anyhow::{Context, Result, anyhow, bail};
use fuzzing_client::TaskclusterClient;
use fuzzing_config::Settings;
use std::path::PathBuf;
use tracing::info;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Local settings file, takes precedence over the secret
    pub configuration: Option<PathBuf>,
    /// Name of the secret holding the settings
    pub taskcluster_secret: Option<String>,
    /// Taskcluster root URL (the task proxy inside a task)
    pub taskcluster_url: String,
}

impl Config {
    pub fn client(&self) -> TaskclusterClient {
        TaskclusterClient::new(&self.taskcluster_url)
    }

    /// Load and validate the decision settings
    pub async fn load_settings(&self, client: &TaskclusterClient) -> Result<Settings> {
        let settings = if let Some(path) = &self.configuration {
            info!("Loading settings from {}", path.display());
            Settings::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
        } else if let Some(secret) = &self.taskcluster_secret {
            info!("Loading settings from secret {}", secret);
            let body = client.get_secret(secret).await.map_err(|e| {
                if e.is_not_found() {
                    anyhow!("Secret {} does not exist", secret)
                } else {
                    anyhow::Error::new(e).context(format!("Failed to read secret {}", secret))
                }
            })?;
            Settings::from_secret(body)?
        } else {
            bail!("No settings source: pass --configuration or --taskcluster-secret");
        };

        settings.validate()?;
        Ok(settings)
    }
}
