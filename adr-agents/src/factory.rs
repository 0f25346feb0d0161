use crate::config::AppConfig;
use crate::medication_data;
use crate::prompts::PromptLibrary;
use crate::root;
use crate::runtime::LlmAgent;
use crate::storage::AgentStorage;
use crate::Agent;
use adr_llm_sdk::auth::TokenProvider;
use adr_llm_sdk::client::LlmClient;
use adr_llm_sdk::gemini::GeminiClient;
use adr_tools::{SecretStore, ToolExecutor};
use std::sync::Arc;

/// Factory for creating the ADR agents with shared dependencies
pub struct AgentFactory<S: AgentStorage> {
    llm_client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    tool_executor: Arc<ToolExecutor>,
    prompts: PromptLibrary,
}

impl<S: AgentStorage + 'static> AgentFactory<S> {
    /// Create a new AgentFactory with the given dependencies
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        storage: Arc<S>,
        tool_executor: Arc<ToolExecutor>,
        prompts: PromptLibrary,
    ) -> Self {
        Self {
            llm_client,
            storage,
            tool_executor,
            prompts,
        }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn provider_name(&self) -> &str {
        self.llm_client.provider_name()
    }

    /// Create the medication data agent
    pub fn create_medication_data_agent(&self) -> anyhow::Result<LlmAgent<S>> {
        medication_data::create_medication_data_agent(
            self.llm_client.clone(),
            self.storage.clone(),
            self.tool_executor.clone(),
            &self.prompts,
        )
    }

    /// Create the root agent together with the medication data agent it delegates to
    pub fn create_root_agent(&self) -> anyhow::Result<LlmAgent<S>> {
        let medication_data_agent: Arc<dyn Agent> = Arc::new(self.create_medication_data_agent()?);

        root::create_root_agent(
            self.llm_client.clone(),
            self.storage.clone(),
            medication_data_agent,
            self.tool_executor.clone(),
            &self.prompts,
        )
    }
}

/// Tool executor wired to the configured database and Confluence site
pub fn create_tool_executor(
    config: &AppConfig,
    project_id: &str,
    secrets: Arc<dyn SecretStore>,
) -> ToolExecutor {
    ToolExecutor::builder()
        .secrets(secrets)
        .medication_db_settings(config.medication_db_settings(project_id))
        .confluence_settings(config.confluence_settings(project_id))
        .build()
}

/// Gemini on Vertex AI or, with Vertex AI turned off, through an API key
pub fn create_llm_client(
    config: &AppConfig,
    project_id: &str,
    tokens: Arc<dyn TokenProvider>,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    let client = if config.gcp.use_vertexai {
        GeminiClient::vertex(project_id, &config.gcp.location, tokens)?
    } else {
        let api_key = config.llm.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "GEMINI_API_KEY or GOOGLE_API_KEY must be set when GOOGLE_GENAI_USE_VERTEXAI is off"
            )
        })?;
        GeminiClient::new(api_key)?
    };

    Ok(Arc::new(client.with_model(&config.llm.model)))
}
