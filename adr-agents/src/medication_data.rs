//! Agent that answers medication questions from the `medicine_details` database

use crate::prompts::{self, PromptLibrary};
use crate::runtime::{AgentDeclaration, LlmAgent};
use crate::storage::AgentStorage;
use crate::tools::{ExecutorTool, Tool};
use crate::AgentTool;
use adr_llm_sdk::client::LlmClient;
use adr_llm_sdk::models::gemini::GEMINI_2_5_FLASH;
use adr_tools::ToolExecutor;
use std::sync::Arc;

pub const NAME: &str = "medication_data_agent";
pub const DESCRIPTION: &str = "Looks up medications in the medicine_details database: \
    composition, uses, manufacturer, reviews and known side effects.";

pub fn declaration(
    prompts: &PromptLibrary,
    tool_executor: Arc<ToolExecutor>,
) -> anyhow::Result<AgentDeclaration> {
    let search: Arc<dyn Tool> = Arc::new(ExecutorTool::new(
        AgentTool::SearchMedicationDatabase,
        tool_executor,
    ));

    Ok(AgentDeclaration {
        name: NAME.to_string(),
        model: GEMINI_2_5_FLASH.to_string(),
        description: DESCRIPTION.to_string(),
        instruction: prompts.render(prompts::MEDICATION_DATA_AGENT)?,
        tools: vec![search],
    })
}

pub fn create_medication_data_agent<S: AgentStorage>(
    client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    tool_executor: Arc<ToolExecutor>,
    prompts: &PromptLibrary,
) -> anyhow::Result<LlmAgent<S>> {
    Ok(LlmAgent::new(
        declaration(prompts, tool_executor)?,
        client,
        storage,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_support::{call, text, ScriptedClient};
    use crate::storage::InMemoryStorage;
    use crate::types::Session;
    use crate::Agent;
    use adr_tools::medication_db::{ConnectionSettings, MedicationDatabase, MedicationDbSettings};
    use adr_tools::{SecretVersion, StaticSecretStore};
    use async_trait::async_trait;

    struct FixedRows;

    #[async_trait]
    impl MedicationDatabase for FixedRows {
        async fn fetch_rows(
            &self,
            _connection: &ConnectionSettings,
            _query: &str,
        ) -> anyhow::Result<Vec<Vec<String>>> {
            Ok(vec![vec![
                "Ibuprofen 400mg Tablet".to_string(),
                "Nausea Headache".to_string(),
            ]])
        }
    }

    #[test]
    fn test_declaration() {
        let declaration =
            declaration(&PromptLibrary::embedded(), Arc::new(ToolExecutor::builder().build()))
                .unwrap();

        assert_eq!(declaration.name, "medication_data_agent");
        assert_eq!(declaration.model, "gemini-2.5-flash");
        assert_eq!(declaration.tools.len(), 1);
        assert_eq!(declaration.tools[0].name(), "search_medication_database");
        assert!(declaration.instruction.contains("medicine_details"));
    }

    #[tokio::test]
    async fn test_queries_database_and_answers() {
        let executor = ToolExecutor::builder()
            .database(Arc::new(FixedRows))
            .secrets(Arc::new(StaticSecretStore::new().with_secret(
                &SecretVersion::new("p", "pw", "1"),
                "secret",
            )))
            .medication_db_settings(MedicationDbSettings {
                project_id: "p".to_string(),
                password_secret_id: Some("pw".to_string()),
                ..Default::default()
            })
            .build();

        let client = Arc::new(ScriptedClient::new(vec![
            call(
                "search_medication_database",
                serde_json::json!({"query": "SELECT \"Medicine Name\", \"Side_effects\" FROM medicine_details"}),
            ),
            text("Ibuprofen lists nausea as a known side effect."),
        ]));
        let storage = Arc::new(InMemoryStorage::new());
        let agent = create_medication_data_agent(
            client.clone(),
            storage.clone(),
            Arc::new(executor),
            &PromptLibrary::embedded(),
        )
        .unwrap();

        let session_id = storage
            .create_session(Session::start(NAME, "scripted", GEMINI_2_5_FLASH, None, "q"))
            .await
            .unwrap();
        let answer = agent
            .execute("Is nausea a side effect of ibuprofen?", session_id)
            .await
            .unwrap();

        assert_eq!(answer, "Ibuprofen lists nausea as a known side effect.");
        let requests = client.requests.lock().unwrap();
        let fed_back = format!("{:?}", requests[1].messages.last().unwrap());
        assert!(fed_back.contains("Ibuprofen 400mg Tablet, Nausea Headache"));
    }
}
