use crate::confluence::{self, ConfluenceApi, ConfluenceClient, ConfluenceSettings};
use crate::medication_db::{self, MedicationDatabase, MedicationDbSettings, PostgresMedicationDatabase};
use crate::secrets::SecretStore;
use crate::types::{ToolRequest, ToolResponse};
use anyhow::Result;
use std::sync::Arc;

/// Tool executor that handles tool requests and responses
pub struct ToolExecutor {
    secrets: Arc<dyn SecretStore>,
    database: Arc<dyn MedicationDatabase>,
    confluence_api: Arc<dyn ConfluenceApi>,
    medication_db: MedicationDbSettings,
    confluence: ConfluenceSettings,
}

impl ToolExecutor {
    /// Start building a ToolExecutor with custom configuration
    pub fn builder() -> ToolExecutorBuilder {
        ToolExecutorBuilder::default()
    }

    pub fn medication_db_settings(&self) -> &MedicationDbSettings {
        &self.medication_db
    }

    pub fn confluence_settings(&self) -> &ConfluenceSettings {
        &self.confluence
    }

    /// Execute a tool request and return a tool response
    pub async fn execute(&self, request: ToolRequest) -> Result<ToolResponse> {
        match request {
            ToolRequest::SearchMedicationDatabase(req) => {
                medication_db::execute_search_medication_database(
                    req,
                    &self.medication_db,
                    self.secrets.as_ref(),
                    self.database.as_ref(),
                )
                .await
                .map_err(|e| anyhow::anyhow!(e))
            }
            ToolRequest::CreateConfluencePage(req) => confluence::execute_create_confluence_page(
                req,
                &self.confluence,
                self.secrets.as_ref(),
                self.confluence_api.as_ref(),
            )
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        }
    }
}

/// Builder for creating a ToolExecutor with custom configuration
#[derive(Default)]
pub struct ToolExecutorBuilder {
    secrets: Option<Arc<dyn SecretStore>>,
    database: Option<Arc<dyn MedicationDatabase>>,
    confluence_api: Option<Arc<dyn ConfluenceApi>>,
    medication_db: Option<MedicationDbSettings>,
    confluence: Option<ConfluenceSettings>,
}

impl ToolExecutorBuilder {
    /// Secret store for database and Confluence credentials
    pub fn secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn database(mut self, database: Arc<dyn MedicationDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    /// Overrides the client built from the Confluence settings' base URL
    pub fn confluence_api(mut self, api: Arc<dyn ConfluenceApi>) -> Self {
        self.confluence_api = Some(api);
        self
    }

    pub fn medication_db_settings(mut self, settings: MedicationDbSettings) -> Self {
        self.medication_db = Some(settings);
        self
    }

    pub fn confluence_settings(mut self, settings: ConfluenceSettings) -> Self {
        self.confluence = Some(settings);
        self
    }

    /// Build the ToolExecutor
    ///
    /// Without a secret store every credential lookup fails.
    pub fn build(self) -> ToolExecutor {
        let confluence = self.confluence.unwrap_or_default();
        let confluence_api = self
            .confluence_api
            .unwrap_or_else(|| Arc::new(ConfluenceClient::new(confluence.base_url.clone())));

        ToolExecutor {
            secrets: self
                .secrets
                .unwrap_or_else(|| Arc::new(crate::secrets::StaticSecretStore::new())),
            database: self
                .database
                .unwrap_or_else(|| Arc::new(PostgresMedicationDatabase::new())),
            confluence_api,
            medication_db: self.medication_db.unwrap_or_default(),
            confluence,
        }
    }
}
