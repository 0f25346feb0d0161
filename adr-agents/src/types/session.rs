use serde::{Deserialize, Serialize};

/// One agent run. Delegated agent calls get their own session with `parent_id` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<i64>,
    pub parent_id: Option<i64>,
    pub agent_name: String,
    pub provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub status: SessionStatus,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl Session {
    /// A running session that has not been stored yet
    pub fn start(
        agent_name: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        system_prompt: Option<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            parent_id: None,
            agent_name: agent_name.into(),
            provider: provider.into(),
            model: model.into(),
            system_prompt,
            user_prompt: user_prompt.into(),
            status: SessionStatus::Running,
            started_at: chrono::Utc::now().timestamp(),
            ended_at: None,
            result: None,
            error: None,
        }
    }

    pub fn complete(&mut self, result: String) {
        self.status = SessionStatus::Completed;
        self.result = Some(result);
        self.ended_at = Some(chrono::Utc::now().timestamp());
    }

    pub fn fail(&mut self, error: String) {
        self.status = SessionStatus::Failed;
        self.error = Some(error);
        self.ended_at = Some(chrono::Utc::now().timestamp());
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}
