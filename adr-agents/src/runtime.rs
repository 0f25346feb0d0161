use crate::storage::AgentStorage;
use crate::tools::{Tool, ToolContext};
use crate::types::{Message, MessageRole, Session, ToolCall as StorageToolCall};
use crate::Agent;
use adr_llm_sdk::client::LlmClient;
use adr_llm_sdk::tools::{ToolCall as LlmToolCall, ToolChoice};
use adr_llm_sdk::types::{CompletionRequest, ContentBlock, Message as LlmMessage, Role};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_MAX_ITERATIONS: usize = 30;
const MAX_TOKENS: u32 = 8192;

/// Static description of an agent
pub struct AgentDeclaration {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<Arc<dyn Tool>>,
}

/// Runs an [`AgentDeclaration`] against an LLM, dispatching tool calls until the model answers
/// with text only
pub struct LlmAgent<S: AgentStorage> {
    declaration: AgentDeclaration,
    client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    max_iterations: usize,
}

impl<S: AgentStorage> LlmAgent<S> {
    pub fn new(declaration: AgentDeclaration, client: Arc<dyn LlmClient>, storage: Arc<S>) -> Self {
        Self {
            declaration,
            client,
            storage,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn declaration(&self) -> &AgentDeclaration {
        &self.declaration
    }

    fn get_tool_definitions(&self) -> Vec<adr_llm_sdk::tools::Tool> {
        self.declaration
            .tools
            .iter()
            .map(|tool| tool.definition())
            .collect()
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.declaration.tools.iter().find(|tool| tool.name() == name)
    }

    async fn build_messages(&self, session_id: i64) -> anyhow::Result<Vec<LlmMessage>> {
        let db_messages = self.storage.get_messages(session_id).await?;

        Ok(db_messages
            .into_iter()
            .map(|msg| {
                // Tool results go back to the model as user turns
                let role = match msg.role {
                    MessageRole::User | MessageRole::Tool => Role::User,
                    MessageRole::Assistant => Role::Assistant,
                };

                LlmMessage {
                    role,
                    content: vec![ContentBlock::Text { text: msg.content }],
                }
            })
            .collect())
    }

    async fn get_session(&self, session_id: i64) -> anyhow::Result<Session> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Session not found: {}", session_id))
    }

    async fn finish_session(&self, session_id: i64, result: &anyhow::Result<String>) -> anyhow::Result<()> {
        let mut session = self.get_session(session_id).await?;
        match result {
            Ok(text) => session.complete(text.clone()),
            Err(e) => session.fail(e.to_string()),
        }
        self.storage.update_session(session).await?;
        Ok(())
    }

    async fn execute_tool_call(
        &self,
        session_id: i64,
        message_id: Option<i64>,
        tool_call: &LlmToolCall,
    ) -> anyhow::Result<()> {
        let mut tool_call_record = StorageToolCall::pending(
            session_id,
            message_id,
            tool_call.id(),
            tool_call.name(),
            tool_call.raw_arguments().clone(),
        );
        let call_id = self
            .storage
            .create_tool_call(tool_call_record.clone())
            .await?;
        tool_call_record.id = Some(call_id);

        let start = Instant::now();
        let result = match self.find_tool(tool_call.name()) {
            Some(tool) => {
                tool.invoke(
                    &ToolContext { session_id },
                    tool_call.raw_arguments().clone(),
                )
                .await
            }
            None => Err(anyhow::anyhow!("Unknown tool: {}", tool_call.name())),
        };
        let execution_time = start.elapsed().as_millis() as i64;

        let message_to_llm = match result {
            Ok(result_text) => {
                tool_call_record.complete(result_text.clone(), execution_time);

                tracing::debug!(
                    tool_name = tool_call.name(),
                    tool_id = tool_call.id(),
                    execution_time_ms = execution_time,
                    "Tool execution completed successfully"
                );

                format!("Tool {} result:\n{}", tool_call.name(), result_text)
            }
            Err(e) => {
                let error_msg = format!("{:#}", e);
                tool_call_record.fail(error_msg.clone(), execution_time);

                tracing::warn!(
                    tool_name = tool_call.name(),
                    tool_id = tool_call.id(),
                    error = %error_msg,
                    "Tool execution failed"
                );

                format!("Tool {} failed: {}", tool_call.name(), error_msg)
            }
        };

        self.storage.update_tool_call(tool_call_record).await?;
        self.storage
            .create_message(Message::new(session_id, MessageRole::Tool, message_to_llm))
            .await?;

        Ok(())
    }

    async fn run(&self, user_prompt: &str, session_id: i64) -> anyhow::Result<String> {
        self.storage
            .create_message(Message::new(session_id, MessageRole::User, user_prompt))
            .await?;

        let tools = self.get_tool_definitions();

        for iteration in 1..=self.max_iterations {
            let messages = self.build_messages(session_id).await?;

            let request = CompletionRequest {
                messages,
                max_tokens: MAX_TOKENS,
                model: self.declaration.model.clone(),
                system: Some(self.declaration.instruction.clone()),
                temperature: None,
                top_p: None,
                stop_sequences: None,
                tools: (!tools.is_empty()).then(|| tools.clone()),
                tool_choice: (!tools.is_empty()).then_some(ToolChoice::Auto),
            };

            tracing::debug!(agent = %self.declaration.name, iteration, "Calling LLM");
            let response = self.client.complete(request).await?;

            let text = extract_text_from_content(&response.content);
            let tool_calls = response.tool_calls.unwrap_or_default();

            let text_to_save = if text.is_empty() && !tool_calls.is_empty() {
                "[Using tools]".to_string()
            } else {
                text.clone()
            };
            let message_id = self
                .storage
                .create_message(Message::new(session_id, MessageRole::Assistant, text_to_save))
                .await?;

            if tool_calls.is_empty() {
                return Ok(text);
            }

            for tool_call in &tool_calls {
                self.execute_tool_call(session_id, Some(message_id), tool_call)
                    .await?;
            }
        }

        Err(anyhow::anyhow!("Maximum iteration limit reached"))
    }
}

#[async_trait]
impl<S: AgentStorage + 'static> Agent for LlmAgent<S> {
    fn name(&self) -> &str {
        &self.declaration.name
    }

    fn description(&self) -> &str {
        &self.declaration.description
    }

    fn model(&self) -> &str {
        &self.declaration.model
    }

    fn system_prompt(&self) -> String {
        self.declaration.instruction.clone()
    }

    fn tool_names(&self) -> Vec<String> {
        self.declaration.tools.iter().map(|tool| tool.name()).collect()
    }

    async fn execute(&self, user_prompt: &str, session_id: i64) -> anyhow::Result<String> {
        tracing::info!(agent = %self.declaration.name, session_id, "Agent started");

        let result = self.run(user_prompt, session_id).await;
        self.finish_session(session_id, &result).await?;

        match &result {
            Ok(_) => tracing::info!(agent = %self.declaration.name, session_id, "Agent finished"),
            Err(e) => tracing::warn!(agent = %self.declaration.name, session_id, error = %e, "Agent failed"),
        }

        result
    }
}

fn extract_text_from_content(content: &[ContentBlock]) -> String {
    content
        .iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
