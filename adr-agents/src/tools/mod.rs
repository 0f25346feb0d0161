//! Tools an agent can call
//!
//! Everything the model can invoke implements [`Tool`]: the typed executor tools from
//! `adr-tools` as well as whole agents wrapped in [`AgentAsTool`].

pub mod llm_schemas;

use crate::storage::AgentStorage;
use crate::types::Session;
use crate::{Agent, AgentTool};
use adr_llm_sdk::tools::Tool as ToolDefinition;
use adr_tools::ToolExecutor;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// The calling agent's session
#[derive(Debug, Clone, Copy)]
pub struct ToolContext {
    pub session_id: i64,
}

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and parameter schema shown to the model
    fn definition(&self) -> ToolDefinition;

    fn name(&self) -> String {
        self.definition().name().to_string()
    }

    /// Runs the tool with the model's JSON arguments and returns text for the model
    async fn invoke(&self, context: &ToolContext, arguments: Value) -> anyhow::Result<String>;
}

/// One of the built-in tools, executed by the shared [`ToolExecutor`]
pub struct ExecutorTool {
    tool: AgentTool,
    executor: Arc<ToolExecutor>,
}

impl ExecutorTool {
    pub fn new(tool: AgentTool, executor: Arc<ToolExecutor>) -> Self {
        Self { tool, executor }
    }
}

#[async_trait]
impl Tool for ExecutorTool {
    fn definition(&self) -> ToolDefinition {
        self.tool.to_tool_definition()
    }

    fn name(&self) -> String {
        self.tool.name().to_string()
    }

    async fn invoke(&self, _context: &ToolContext, arguments: Value) -> anyhow::Result<String> {
        let request = AgentTool::parse_tool_call(self.tool.name(), arguments)?;
        let response = self.executor.execute(request).await?;
        Ok(crate::format_tool_response(&response))
    }
}

/// Lets a parent agent delegate to `agent` as if it were a tool.
///
/// Each call runs in a new child session of the caller's session.
pub struct AgentAsTool<S: AgentStorage> {
    agent: Arc<dyn Agent>,
    storage: Arc<S>,
    provider: String,
}

impl<S: AgentStorage> AgentAsTool<S> {
    pub fn new(agent: Arc<dyn Agent>, storage: Arc<S>, provider: impl Into<String>) -> Self {
        Self {
            agent,
            storage,
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl<S: AgentStorage + 'static> Tool for AgentAsTool<S> {
    fn definition(&self) -> ToolDefinition {
        llm_schemas::agent_tool(self.agent.name(), self.agent.description())
    }

    fn name(&self) -> String {
        self.agent.name().to_string()
    }

    async fn invoke(&self, context: &ToolContext, arguments: Value) -> anyhow::Result<String> {
        let args: llm_schemas::AgentRequest = serde_json::from_value(arguments)?;

        let mut session = Session::start(
            self.agent.name(),
            self.provider.clone(),
            self.agent.model(),
            Some(self.agent.system_prompt()),
            args.request.clone(),
        );
        session.parent_id = Some(context.session_id);
        let session_id = self.storage.create_session(session).await?;

        tracing::debug!(
            agent = self.agent.name(),
            parent_session_id = context.session_id,
            session_id,
            "Delegating to agent"
        );

        self.agent.execute(&args.request, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use adr_tools::medication_db::ONLY_SELECT_ALLOWED;
    use std::sync::Mutex;

    struct EchoAgent {
        calls: Mutex<Vec<(String, i64)>>,
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn name(&self) -> &str {
            "echo_agent"
        }

        fn description(&self) -> &str {
            "Repeats the request"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn system_prompt(&self) -> String {
            "Repeat".to_string()
        }

        fn tool_names(&self) -> Vec<String> {
            Vec::new()
        }

        async fn execute(&self, user_prompt: &str, session_id: i64) -> anyhow::Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((user_prompt.to_string(), session_id));
            Ok(format!("echo: {}", user_prompt))
        }
    }

    #[tokio::test]
    async fn test_executor_tool_formats_response() {
        let tool = ExecutorTool::new(
            AgentTool::SearchMedicationDatabase,
            Arc::new(ToolExecutor::builder().build()),
        );

        assert_eq!(tool.name(), "search_medication_database");
        let result = tool
            .invoke(
                &ToolContext { session_id: 1 },
                serde_json::json!({"query": "DELETE FROM medicine_details"}),
            )
            .await
            .unwrap();
        assert_eq!(result, ONLY_SELECT_ALLOWED);
    }

    #[tokio::test]
    async fn test_executor_tool_rejects_bad_arguments() {
        let tool = ExecutorTool::new(
            AgentTool::CreateConfluencePage,
            Arc::new(ToolExecutor::builder().build()),
        );
        let result = tool
            .invoke(&ToolContext { session_id: 1 }, serde_json::json!({"dose": "1"}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_agent_as_tool_opens_child_session() {
        let storage = Arc::new(InMemoryStorage::new());
        let agent = Arc::new(EchoAgent {
            calls: Mutex::new(Vec::new()),
        });
        let tool = AgentAsTool::new(agent.clone(), storage.clone(), "google");

        let definition = tool.definition();
        assert_eq!(definition.name(), "echo_agent");
        assert_eq!(definition.description(), "Repeats the request");

        let parent = storage
            .create_session(Session::start("root_agent", "google", "m", None, "x"))
            .await
            .unwrap();

        let first = tool
            .invoke(
                &ToolContext { session_id: parent },
                serde_json::json!({"request": "Aspirin side effects"}),
            )
            .await
            .unwrap();
        tool.invoke(
            &ToolContext { session_id: parent },
            serde_json::json!({"request": "again"}),
        )
        .await
        .unwrap();

        assert_eq!(first, "echo: Aspirin side effects");

        let children = storage.get_child_sessions(parent).await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].agent_name, "echo_agent");
        assert_eq!(children[0].user_prompt, "Aspirin side effects");

        let calls = agent.calls.lock().unwrap();
        assert_ne!(calls[0].1, calls[1].1);
        assert_eq!(Some(calls[0].1), children[0].id);
    }

    #[tokio::test]
    async fn test_agent_as_tool_requires_request() {
        let storage = Arc::new(InMemoryStorage::new());
        let agent = Arc::new(EchoAgent {
            calls: Mutex::new(Vec::new()),
        });
        let tool = AgentAsTool::new(agent, storage, "google");

        let result = tool
            .invoke(&ToolContext { session_id: 1 }, serde_json::json!({"query": "x"}))
            .await;
        assert!(result.is_err());
    }
}
