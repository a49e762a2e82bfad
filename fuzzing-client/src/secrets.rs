//! Secrets API endpoints

use serde::Deserialize;

use crate::TaskclusterClient;
use crate::error::Result;

#[derive(Deserialize)]
struct SecretResponse {
    secret: serde_json::Value,
}

impl TaskclusterClient {
    /// Fetch a secret and return its body
    ///
    /// # Arguments
    /// * `name` - Secret name, e.g. `project/fuzzing/decision`
    ///
    /// # Returns
    /// The content of the secret's `secret` field
    pub async fn get_secret(&self, name: &str) -> Result<serde_json::Value> {
        let url = self.url("secrets", &format!("secret/{}", name));
        let response = self.client.get(&url).send().await?;

        let body: SecretResponse = self.handle_response(response).await?;
        Ok(body.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_secret() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/secrets/v1/secret/project/fuzzing/decision"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secret": {"fuzzing_config_dir": "/src/fuzzing"},
                "expires": "2030-01-01T00:00:00.000Z",
            })))
            .mount(&mock_server)
            .await;

        let client = TaskclusterClient::new(mock_server.uri());
        let secret = client.get_secret("project/fuzzing/decision").await.unwrap();
        assert_eq!(secret, json!({"fuzzing_config_dir": "/src/fuzzing"}));
    }

    #[tokio::test]
    async fn test_get_missing_secret() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("ResourceNotFound"))
            .mount(&mock_server)
            .await;

        let client = TaskclusterClient::new(mock_server.uri());
        let err = client.get_secret("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_secret() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
            .mount(&mock_server)
            .await;

        let client = TaskclusterClient::new(mock_server.uri());
        let err = client.get_secret("broken").await.unwrap_err();
        assert!(matches!(err, crate::ClientError::Body(_)));
    }
}
