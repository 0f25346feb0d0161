use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchMedicationDatabaseRequest {
    /// A SQL SELECT query for the medicine_details table, e.g.
    /// SELECT "Medicine Name", "Composition", "Uses", "Side_effects", "Image URL", "Manufacturer",
    /// "Excellent Review %", "Average Review %", "Poor Review %" FROM medicine_details
    /// WHERE LOWER("Side_effects") LIKE '%headache%'
    #[schemars(
        description = "A single SQL SELECT query against the medicine_details table. Only one statement is allowed."
    )]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchMedicationDatabaseResponse {
    /// Rows as comma-separated lines, a refusal, or a database error description
    pub result: String,
}
