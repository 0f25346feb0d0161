//! Entry agent: collects the adverse drug reaction report, checks the medication through the
//! medication data agent and documents the report in Confluence

use crate::prompts::{self, PromptLibrary};
use crate::runtime::{AgentDeclaration, LlmAgent};
use crate::storage::AgentStorage;
use crate::tools::{AgentAsTool, ExecutorTool, Tool};
use crate::{Agent, AgentTool};
use adr_llm_sdk::client::LlmClient;
use adr_llm_sdk::models::gemini::GEMINI_2_5_FLASH;
use adr_tools::ToolExecutor;
use std::sync::Arc;

pub const NAME: &str = "root_agent";
pub const DESCRIPTION: &str =
    "Records adverse drug reaction reports and documents them as Confluence pages.";

pub fn declaration<S: AgentStorage + 'static>(
    prompts: &PromptLibrary,
    medication_data_agent: Arc<dyn Agent>,
    storage: Arc<S>,
    provider: &str,
    tool_executor: Arc<ToolExecutor>,
) -> anyhow::Result<AgentDeclaration> {
    let delegate: Arc<dyn Tool> = Arc::new(AgentAsTool::new(
        medication_data_agent,
        storage,
        provider,
    ));
    let confluence: Arc<dyn Tool> = Arc::new(ExecutorTool::new(
        AgentTool::CreateConfluencePage,
        tool_executor,
    ));

    Ok(AgentDeclaration {
        name: NAME.to_string(),
        model: GEMINI_2_5_FLASH.to_string(),
        description: DESCRIPTION.to_string(),
        instruction: prompts.render(prompts::ROOT_AGENT)?,
        tools: vec![delegate, confluence],
    })
}

pub fn create_root_agent<S: AgentStorage + 'static>(
    client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    medication_data_agent: Arc<dyn Agent>,
    tool_executor: Arc<ToolExecutor>,
    prompts: &PromptLibrary,
) -> anyhow::Result<LlmAgent<S>> {
    let declaration = declaration(
        prompts,
        medication_data_agent,
        storage.clone(),
        client.provider_name(),
        tool_executor,
    )?;
    Ok(LlmAgent::new(declaration, client, storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_support::{call, text, ScriptedClient};
    use crate::storage::InMemoryStorage;
    use crate::types::{Session, SessionStatus};
    use adr_tools::confluence::{
        BasicCredentials, ConfluenceApi, ConfluenceSettings, CreatePageRequest,
    };
    use adr_tools::{SecretVersion, StaticSecretStore, ToolError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingConfluence {
        pages: Mutex<Vec<CreatePageRequest>>,
    }

    #[async_trait]
    impl ConfluenceApi for RecordingConfluence {
        fn base_url(&self) -> &str {
            "https://wiki.example.com/wiki"
        }

        async fn create_page(
            &self,
            _credentials: &BasicCredentials,
            page: &CreatePageRequest,
        ) -> Result<Option<serde_json::Value>, ToolError> {
            self.pages.lock().unwrap().push(page.clone());
            Ok(Some(serde_json::json!({"_links": {"webui": "/spaces/GC/pages/1"}})))
        }
    }

    fn executor(confluence: Arc<RecordingConfluence>) -> Arc<ToolExecutor> {
        let secret = SecretVersion::new("p", "confluence-token", "1");
        Arc::new(
            ToolExecutor::builder()
                .secrets(Arc::new(StaticSecretStore::new().with_secret(&secret, "token")))
                .confluence_api(confluence)
                .confluence_settings(ConfluenceSettings {
                    project_id: "p".to_string(),
                    username: Some("bot@example.com".to_string()),
                    secret_id: Some("confluence-token".to_string()),
                    secret_version: Some("1".to_string()),
                    ..Default::default()
                })
                .build(),
        )
    }

    #[tokio::test]
    async fn test_root_agent_delegates_and_creates_page() {
        let confluence = Arc::new(RecordingConfluence {
            pages: Mutex::new(Vec::new()),
        });
        let tool_executor = executor(confluence.clone());
        let storage = Arc::new(InMemoryStorage::new());
        let prompts = PromptLibrary::embedded();

        let medication_client = Arc::new(ScriptedClient::new(vec![text(
            "Nausea is a known side effect of Ibuprofen.",
        )]));
        let medication_agent: Arc<dyn Agent> = Arc::new(
            crate::medication_data::create_medication_data_agent(
                medication_client,
                storage.clone(),
                tool_executor.clone(),
                &prompts,
            )
            .unwrap(),
        );

        let root_client = Arc::new(ScriptedClient::new(vec![
            call(
                "medication_data_agent",
                serde_json::json!({"request": "Is nausea a known side effect of Ibuprofen?"}),
            ),
            call(
                "create_confluence_page",
                serde_json::json!({"medication": "Ibuprofen", "side_effect": "nausea", "side_effect_intensity": 4}),
            ),
            text("The report is documented at https://wiki.example.com/wiki/spaces/GC/pages/1"),
        ]));
        let root = create_root_agent(
            root_client.clone(),
            storage.clone(),
            medication_agent,
            tool_executor,
            &prompts,
        )
        .unwrap();

        assert_eq!(
            root.tool_names(),
            vec!["medication_data_agent", "create_confluence_page"]
        );

        let session_id = storage
            .create_session(Session::start(NAME, "scripted", GEMINI_2_5_FLASH, None, "report"))
            .await
            .unwrap();
        let answer = root
            .execute("Ich habe nach Ibuprofen Übelkeit bekommen.", session_id)
            .await
            .unwrap();
        assert!(answer.contains("/spaces/GC/pages/1"));

        let children = storage.get_child_sessions(session_id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].agent_name, "medication_data_agent");
        assert_eq!(children[0].status, SessionStatus::Completed);

        let pages = confluence.pages.lock().unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].title.starts_with("Adverse Drug Reaction: Ibuprofen - "));
        assert!(pages[0]
            .body
            .contains("<tr><th>Side Effect Intensity</th><td>4</td></tr>"));

        let requests = root_client.requests.lock().unwrap();
        let after_page = format!("{:?}", requests[2].messages.last().unwrap());
        assert!(after_page.contains(
            "Confluence page created at url: https://wiki.example.com/wiki/spaces/GC/pages/1, "
        ));
    }

    #[tokio::test]
    async fn test_page_created_after_confirmation_turn() {
        let confluence = Arc::new(RecordingConfluence {
            pages: Mutex::new(Vec::new()),
        });
        let tool_executor = executor(confluence.clone());
        let storage = Arc::new(InMemoryStorage::new());
        let prompts = PromptLibrary::embedded();

        let medication_agent: Arc<dyn Agent> = Arc::new(
            crate::medication_data::create_medication_data_agent(
                Arc::new(ScriptedClient::new(Vec::new())),
                storage.clone(),
                tool_executor.clone(),
                &prompts,
            )
            .unwrap(),
        );
        let root_client = Arc::new(ScriptedClient::new(vec![
            text("Medication: Ibuprofen, side effect: nausea. Shall I document this report?"),
            call(
                "create_confluence_page",
                serde_json::json!({"medication": "Ibuprofen", "side_effect": "nausea"}),
            ),
            text("Documented."),
        ]));
        let root = create_root_agent(
            root_client,
            storage.clone(),
            medication_agent,
            tool_executor,
            &prompts,
        )
        .unwrap();

        let session_id = storage
            .create_session(Session::start(NAME, "scripted", GEMINI_2_5_FLASH, None, ""))
            .await
            .unwrap();

        let input = "Nausea after Ibuprofen\nyes\nexit\n".as_bytes();
        let mut output = Vec::new();
        let turns =
            crate::conversation::run_conversation(&root, session_id, input, &mut output)
                .await
                .unwrap();

        assert_eq!(turns, 2);
        assert_eq!(confluence.pages.lock().unwrap().len(), 1);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Shall I document this report?"));
        assert!(output.contains("Documented."));
    }
}
