use crate::storage::{AgentStorage, StorageError};
use crate::types::{Message, Session, ToolCall};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local storage; everything is lost on exit
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    next_id: Arc<AtomicI64>,
    sessions: Arc<Mutex<HashMap<i64, Session>>>,
    messages: Arc<Mutex<HashMap<i64, Vec<Message>>>>,
    tool_calls: Arc<Mutex<HashMap<i64, Vec<ToolCall>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::OperationFailed(format!("Storage lock poisoned: {}", e)))
}

#[async_trait::async_trait]
impl AgentStorage for InMemoryStorage {
    async fn create_session(&self, mut session: Session) -> Result<i64, StorageError> {
        let session_id = self.next_id();
        session.id = Some(session_id);
        lock(&self.sessions)?.insert(session_id, session);
        Ok(session_id)
    }

    async fn get_session(&self, session_id: i64) -> Result<Option<Session>, StorageError> {
        Ok(lock(&self.sessions)?.get(&session_id).cloned())
    }

    async fn update_session(&self, session: Session) -> Result<(), StorageError> {
        let session_id = session
            .id
            .ok_or_else(|| StorageError::NotFound("Session has no id".to_string()))?;
        let mut sessions = lock(&self.sessions)?;
        if !sessions.contains_key(&session_id) {
            return Err(StorageError::NotFound(format!("Session {}", session_id)));
        }
        sessions.insert(session_id, session);
        Ok(())
    }

    async fn get_child_sessions(&self, parent_id: i64) -> Result<Vec<Session>, StorageError> {
        let mut children: Vec<Session> = lock(&self.sessions)?
            .values()
            .filter(|s| s.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|s| s.id);
        Ok(children)
    }

    async fn create_message(&self, mut message: Message) -> Result<i64, StorageError> {
        let message_id = self.next_id();
        message.id = Some(message_id);
        lock(&self.messages)?
            .entry(message.session_id)
            .or_default()
            .push(message);
        Ok(message_id)
    }

    async fn get_messages(&self, session_id: i64) -> Result<Vec<Message>, StorageError> {
        Ok(lock(&self.messages)?
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_tool_call(&self, mut tool_call: ToolCall) -> Result<i64, StorageError> {
        let tool_call_id = self.next_id();
        tool_call.id = Some(tool_call_id);
        lock(&self.tool_calls)?
            .entry(tool_call.session_id)
            .or_default()
            .push(tool_call);
        Ok(tool_call_id)
    }

    async fn update_tool_call(&self, tool_call: ToolCall) -> Result<(), StorageError> {
        let tool_call_id = tool_call
            .id
            .ok_or_else(|| StorageError::NotFound("Tool call has no id".to_string()))?;
        let mut tool_calls = lock(&self.tool_calls)?;
        let slot = tool_calls
            .get_mut(&tool_call.session_id)
            .and_then(|calls| calls.iter_mut().find(|c| c.id == Some(tool_call_id)))
            .ok_or_else(|| StorageError::NotFound(format!("Tool call {}", tool_call_id)))?;
        *slot = tool_call;
        Ok(())
    }

    async fn get_tool_calls(&self, session_id: i64) -> Result<Vec<ToolCall>, StorageError> {
        Ok(lock(&self.tool_calls)?
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }
}
