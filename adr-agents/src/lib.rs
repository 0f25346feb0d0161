pub mod config;
pub mod conversation;
pub mod factory;
pub mod medication_data;
pub mod prompts;
pub mod root;
pub mod runtime;
pub mod storage;
pub mod tools;
pub mod types;

use adr_tools::types::{AdverseEventReport, SearchMedicationDatabaseRequest, ToolRequest, ToolResponse};
use async_trait::async_trait;

/// Represents the types of tools available to agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTool {
    SearchMedicationDatabase,
    CreateConfluencePage,
}

impl AgentTool {
    /// Returns the tool name as used in ToolRequest
    pub fn name(&self) -> &'static str {
        match self {
            AgentTool::SearchMedicationDatabase => "search_medication_database",
            AgentTool::CreateConfluencePage => "create_confluence_page",
        }
    }

    /// Convert AgentTool to adr-llm-sdk Tool definition for LLM
    pub fn to_tool_definition(&self) -> adr_llm_sdk::tools::Tool {
        match self {
            AgentTool::SearchMedicationDatabase => tools::llm_schemas::search_medication_database(),
            AgentTool::CreateConfluencePage => tools::llm_schemas::create_confluence_page(),
        }
    }

    /// Parse LLM tool call into typed ToolRequest
    pub fn parse_tool_call(name: &str, arguments: serde_json::Value) -> anyhow::Result<ToolRequest> {
        let request = match name {
            "search_medication_database" => {
                let req: SearchMedicationDatabaseRequest = serde_json::from_value(arguments)?;
                ToolRequest::SearchMedicationDatabase(req)
            }
            "create_confluence_page" => {
                let req: AdverseEventReport = serde_json::from_value(arguments)?;
                ToolRequest::CreateConfluencePage(req)
            }
            _ => anyhow::bail!("Unknown tool: {}", name),
        };

        Ok(request)
    }
}

/// Format ToolResponse for display to LLM
pub fn format_tool_response(response: &ToolResponse) -> String {
    match response {
        ToolResponse::SearchMedicationDatabase(r) => r.result.clone(),
        ToolResponse::CreateConfluencePage(r) => r.message.clone(),
    }
}

/// Trait defining the structure and behavior of an AI agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name, also used as the tool name when the agent is delegated to
    fn name(&self) -> &str;

    /// What the agent does, shown to a parent agent
    fn description(&self) -> &str;

    fn model(&self) -> &str;

    /// Returns the system prompt for the agent
    fn system_prompt(&self) -> String;

    /// Names of the tools available to this agent
    fn tool_names(&self) -> Vec<String>;

    /// Run the agent on a prompt inside an existing session
    async fn execute(&self, user_prompt: &str, session_id: i64) -> anyhow::Result<String>;
}
