//! Credential lookup keyed by (project, secret id, version)

use crate::tool_error::ToolError;
use async_trait::async_trait;
use std::collections::HashMap;

mod secret_manager;

pub use secret_manager::SecretManagerClient;

/// A single version of a secret in a project
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretVersion {
    pub project_id: String,
    pub secret_id: String,
    pub version: String,
}

impl SecretVersion {
    pub fn new(
        project_id: impl Into<String>,
        secret_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            secret_id: secret_id.into(),
            version: version.into(),
        }
    }

    /// Resource name, `projects/{project}/secrets/{secret}/versions/{version}`
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, self.secret_id, self.version
        )
    }
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the secret payload decoded as UTF-8
    async fn access(&self, secret: &SecretVersion) -> Result<String, ToolError>;
}

/// Secrets held in memory, for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, secret: &SecretVersion, value: impl Into<String>) -> Self {
        self.secrets.insert(secret.resource_name(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn access(&self, secret: &SecretVersion) -> Result<String, ToolError> {
        self.secrets
            .get(&secret.resource_name())
            .cloned()
            .ok_or_else(|| {
                ToolError::SecretAccess(format!("Secret not found: {}", secret.resource_name()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name() {
        let secret = SecretVersion::new("adr-project", "confluence-token", "3");
        assert_eq!(
            secret.resource_name(),
            "projects/adr-project/secrets/confluence-token/versions/3"
        );
    }

    #[tokio::test]
    async fn test_static_store() {
        let secret = SecretVersion::new("p", "db-password", "1");
        let store = StaticSecretStore::new().with_secret(&secret, "hunter2");

        assert_eq!(store.access(&secret).await.unwrap(), "hunter2");

        let missing = SecretVersion::new("p", "db-password", "2");
        assert!(matches!(
            store.access(&missing).await,
            Err(ToolError::SecretAccess(_))
        ));
    }
}
