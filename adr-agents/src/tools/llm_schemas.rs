use adr_llm_sdk::tools::Tool;
use adr_tools::types::{AdverseEventReport, SearchMedicationDatabaseRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments of an agent that is called as a tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRequest {
    #[schemars(description = "The request for the agent, in natural language.")]
    pub request: String,
}

pub fn search_medication_database() -> Tool {
    Tool::from_type::<SearchMedicationDatabaseRequest>()
        .name("search_medication_database")
        .description(
            "Searches the medicine_details table for medications and their side effects. \
             Returns rows of Medicine Name, Composition, Uses, Side_effects, Image URL, \
             Manufacturer, Excellent Review %, Average Review %, Poor Review %.",
        )
        .build()
}

pub fn create_confluence_page() -> Tool {
    Tool::from_type::<AdverseEventReport>()
        .name("create_confluence_page")
        .description(
            "Creates a Confluence page to document an adverse drug reaction (ADR). The page \
             includes structured patient data, medication details and information about the \
             reported side effect.",
        )
        .build()
}

/// Definition for delegating to another agent by name
pub fn agent_tool(name: &str, description: &str) -> Tool {
    Tool::from_type::<AgentRequest>()
        .name(name)
        .description(description)
        .build()
}
