/// Tool execution error
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Secret access failed: {0}")]
    SecretAccess(String),
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::RequestFailed(err.to_string())
    }
}

impl From<adr_llm_sdk::error::LlmError> for ToolError {
    fn from(err: adr_llm_sdk::error::LlmError) -> Self {
        ToolError::SecretAccess(err.to_string())
    }
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        ToolError::ExecutionError(err.to_string())
    }
}
