use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<i64>,
    pub session_id: i64,
    pub message_id: Option<i64>,
    pub tool_call_id: String,
    pub tool_name: String,
    pub request: serde_json::Value,
    pub response: Option<String>,
    pub status: ToolCallStatus,
    pub execution_time_ms: Option<i64>,
    pub created_at: i64,
    pub completed_at: Option<i64>,
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolCallStatus {
    Pending,
    Completed,
    Failed,
}

impl ToolCallStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ToolCallStatus::Pending => "pending",
            ToolCallStatus::Completed => "completed",
            ToolCallStatus::Failed => "failed",
        }
    }
}

impl ToolCall {
    pub fn pending(
        session_id: i64,
        message_id: Option<i64>,
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        request: serde_json::Value,
    ) -> Self {
        Self {
            id: None,
            session_id,
            message_id,
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            request,
            response: None,
            status: ToolCallStatus::Pending,
            execution_time_ms: None,
            created_at: chrono::Utc::now().timestamp(),
            completed_at: None,
            error_details: None,
        }
    }

    pub fn complete(&mut self, response: String, execution_time_ms: i64) {
        self.response = Some(response);
        self.status = ToolCallStatus::Completed;
        self.completed_at = Some(chrono::Utc::now().timestamp());
        self.execution_time_ms = Some(execution_time_ms);
    }

    pub fn fail(&mut self, error: String, execution_time_ms: i64) {
        self.status = ToolCallStatus::Failed;
        self.error_details = Some(error);
        self.completed_at = Some(chrono::Utc::now().timestamp());
        self.execution_time_ms = Some(execution_time_ms);
    }
}
