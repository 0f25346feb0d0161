use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tool request enum containing all possible tool operations
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ToolRequest {
    #[serde(rename = "search_medication_database")]
    SearchMedicationDatabase(super::medication_db::SearchMedicationDatabaseRequest),
    #[serde(rename = "create_confluence_page")]
    CreateConfluencePage(super::confluence::AdverseEventReport),
}

/// Tool response enum containing all possible tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResponse {
    #[serde(rename = "search_medication_database")]
    SearchMedicationDatabase(super::medication_db::SearchMedicationDatabaseResponse),
    #[serde(rename = "create_confluence_page")]
    CreateConfluencePage(super::confluence::CreateConfluencePageResponse),
}
