//! Google Cloud access tokens for Vertex AI and other Google APIs
//!
//! Tokens come either from a fixed value (for example `gcloud auth print-access-token`) or from
//! the GCE / Cloud Run metadata server, which also reports the default project id.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
const METADATA_FLAVOR: &str = "Metadata-Flavor";
/// Refresh this long before the reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of OAuth2 bearer tokens for Google APIs
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, LlmError>;
}

/// Fixed access token
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, LlmError> {
        if self.token.is_empty() {
            return Err(LlmError::authentication("Access token cannot be empty"));
        }
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Access tokens of the attached service account, read from the metadata server
pub struct MetadataServerTokenProvider {
    base_url: String,
    http_client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerTokenProvider {
    /// Uses `GCE_METADATA_HOST` when set, otherwise `metadata.google.internal`
    pub fn new() -> Result<Self, LlmError> {
        let host = std::env::var("GCE_METADATA_HOST")
            .unwrap_or_else(|_| DEFAULT_METADATA_HOST.to_string());
        Self::with_base_url(format!("http://{}", host))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            cached: Mutex::new(None),
        })
    }

    /// Default project id of the environment
    pub async fn project_id(&self) -> Result<String, LlmError> {
        let url = format!("{}/computeMetadata/v1/project/project-id", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header(METADATA_FLAVOR, "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::api_error(status.as_u16(), body));
        }

        let project_id = response.text().await?.trim().to_string();
        if project_id.is_empty() {
            return Err(LlmError::internal("Metadata server returned an empty project id"));
        }
        Ok(project_id)
    }

    async fn fetch_token(&self) -> Result<MetadataToken, LlmError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.base_url
        );
        let response = self
            .http_client
            .get(&url)
            .header(METADATA_FLAVOR, "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::authentication(format!(
                "Metadata server refused token request (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<MetadataToken>()
            .await
            .map_err(|e| LlmError::internal(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl TokenProvider for MetadataServerTokenProvider {
    async fn access_token(&self) -> Result<String, LlmError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(expires_in = fresh.expires_in, "Fetched metadata server access token");

        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }
}
