pub mod confluence;
pub mod core;
pub mod medication_db;

// Re-export commonly used types
pub use confluence::{AdverseEventReport, CreateConfluencePageResponse, Gender, MealTiming};
pub use core::{ToolRequest, ToolResponse};
pub use medication_db::{SearchMedicationDatabaseRequest, SearchMedicationDatabaseResponse};
