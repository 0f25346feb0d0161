use crate::{
    error::LlmError,
    types::{CompletionRequest, CompletionResponse},
};
use async_trait::async_trait;

/// Core trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Get provider name (e.g., "google", "vertex_ai")
    fn provider_name(&self) -> &str;

    /// Get model name (e.g., "gemini-2.5-flash")
    fn model_name(&self) -> &str;
}
