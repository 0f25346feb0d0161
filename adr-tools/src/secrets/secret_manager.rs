use super::{SecretStore, SecretVersion};
use crate::tool_error::ToolError;
use adr_llm_sdk::auth::TokenProvider;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    /// Base64-encoded secret bytes
    data: String,
}

/// Google Cloud Secret Manager REST client
pub struct SecretManagerClient {
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    http_client: reqwest::Client,
}

impl SecretManagerClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url: "https://secretmanager.googleapis.com".to_string(),
            tokens,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn access(&self, secret: &SecretVersion) -> Result<String, ToolError> {
        let url = format!("{}/v1/{}:access", self.base_url, secret.resource_name());
        let token = self.tokens.access_token().await?;

        tracing::debug!(secret = %secret.resource_name(), "Accessing secret version");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AccessSecretVersionResponse = response.json().await?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.payload.data.as_bytes())
            .map_err(|e| ToolError::SecretAccess(format!("Invalid secret payload: {}", e)))?;

        String::from_utf8(bytes)
            .map_err(|e| ToolError::SecretAccess(format!("Secret is not valid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adr_llm_sdk::auth::StaticTokenProvider;

    #[tokio::test]
    async fn test_access_decodes_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/v1/projects/adr-project/secrets/db-password/versions/1:access",
            )
            .match_header("authorization", "Bearer ya29.test")
            .with_status(200)
            .with_header("content-type", "application/json")
            // "s3cret-ü" in base64
            .with_body(r#"{"name":"projects/123/secrets/db-password/versions/1","payload":{"data":"czNjcmV0LcO8"}}"#)
            .create_async()
            .await;

        let client = SecretManagerClient::new(Arc::new(StaticTokenProvider::new("ya29.test")))
            .with_base_url(server.url());
        let secret = SecretVersion::new("adr-project", "db-password", "1");

        assert_eq!(client.access(&secret).await.unwrap(), "s3cret-ü");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_access_propagates_service_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/v1/projects/adr-project/secrets/missing/versions/1:access",
            )
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"Secret not found","status":"NOT_FOUND"}}"#)
            .create_async()
            .await;

        let client = SecretManagerClient::new(Arc::new(StaticTokenProvider::new("token")))
            .with_base_url(server.url());
        let secret = SecretVersion::new("adr-project", "missing", "1");

        match client.access(&secret).await {
            Err(ToolError::Api { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
