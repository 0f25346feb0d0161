//! `search_medication_database` - read-only lookups in the `medicine_details` table
//!
//! The guard in [`prepare_query`] is a prefix and semicolon check. It keeps the model from
//! chaining statements by accident; it is not a security boundary, so the database user should
//! only hold `SELECT` privileges.
//!
//! ```rust,no_run
//! use adr_tools::medication_db::{prepare_query, ONLY_SELECT_ALLOWED};
//!
//! assert_eq!(
//!     prepare_query("SELECT * FROM medicine_details;").unwrap(),
//!     "SELECT * FROM medicine_details"
//! );
//! assert_eq!(
//!     prepare_query("DELETE FROM medicine_details").unwrap_err().message(),
//!     ONLY_SELECT_ALLOWED
//! );
//! ```

use crate::secrets::{SecretStore, SecretVersion};
use crate::tool_error::ToolError;
use crate::types::{SearchMedicationDatabaseRequest, SearchMedicationDatabaseResponse, ToolResponse};

pub mod executor;

pub use executor::{ConnectionSettings, MedicationDatabase, PostgresMedicationDatabase};

pub const ONLY_SELECT_ALLOWED: &str = "Nur SELECT-Statements sind erlaubt.";
pub const SINGLE_STATEMENT_ONLY: &str =
    "Nur ein einzelnes SELECT-Statement ohne weitere SQL-Befehle ist erlaubt.";
pub const NO_RESULTS: &str = "No results found for the query.";

pub const DEFAULT_DATABASE: &str = "medicine_details";
pub const DEFAULT_PORT: u16 = 5432;

/// Why a query was refused before reaching the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRejection {
    NotSelect,
    MultipleStatements,
}

impl QueryRejection {
    /// Text returned to the model
    pub fn message(&self) -> &'static str {
        match self {
            QueryRejection::NotSelect => ONLY_SELECT_ALLOWED,
            QueryRejection::MultipleStatements => SINGLE_STATEMENT_ONLY,
        }
    }
}

/// Checks the query and returns the text to execute.
///
/// Inspection runs on a trimmed, lower-cased copy. The returned text keeps the original case;
/// a single trailing `;` is removed.
pub fn prepare_query(query: &str) -> Result<String, QueryRejection> {
    let cleaned = query.trim().to_lowercase();

    if !cleaned.starts_with("select") {
        return Err(QueryRejection::NotSelect);
    }

    if cleaned.contains(';') {
        if cleaned.matches(';').count() > 1 || !cleaned.trim_end().ends_with(';') {
            return Err(QueryRejection::MultipleStatements);
        }
        return Ok(query.trim_end().trim_end_matches(';').to_string());
    }

    Ok(query.to_string())
}

/// Rows as `", "`-joined values, one line per row
pub fn render_rows(rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    rows.iter()
        .map(|row| row.join(", "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where the medication database lives and which credentials to use
#[derive(Debug, Clone)]
pub struct MedicationDbSettings {
    pub project_id: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password_secret_id: Option<String>,
    pub password_secret_version: String,
}

impl Default for MedicationDbSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            user: None,
            password_secret_id: None,
            password_secret_version: "1".to_string(),
        }
    }
}

/// Main entry point for `search_medication_database`.
///
/// Refusals and database failures come back as the response text. Secret lookup failures are
/// returned as errors.
pub async fn execute_search_medication_database(
    request: SearchMedicationDatabaseRequest,
    settings: &MedicationDbSettings,
    secrets: &dyn SecretStore,
    database: &dyn MedicationDatabase,
) -> Result<ToolResponse, ToolError> {
    tracing::info!(query = %request.query, "search_medication_database");

    let query = match prepare_query(&request.query) {
        Ok(query) => query,
        Err(rejection) => {
            tracing::info!(?rejection, "Query refused");
            return Ok(respond(rejection.message().to_string()));
        }
    };

    let secret_id = settings.password_secret_id.as_deref().ok_or_else(|| {
        ToolError::MissingConfig("POSTGRES_PASSWORD_SECRET is not set".to_string())
    })?;
    let password = secrets
        .access(&SecretVersion::new(
            &settings.project_id,
            secret_id,
            &settings.password_secret_version,
        ))
        .await?;

    let connection = ConnectionSettings {
        host: settings.host.clone(),
        port: settings.port,
        database: settings.database.clone(),
        user: settings.user.clone(),
        password,
    };

    let result = match database.fetch_rows(&connection, &query).await {
        Ok(rows) => render_rows(&rows),
        Err(e) => {
            tracing::warn!(error = %e, "Medication database query failed");
            format!("Database error: {}", e)
        }
    };

    Ok(respond(result))
}

fn respond(result: String) -> ToolResponse {
    ToolResponse::SearchMedicationDatabase(SearchMedicationDatabaseResponse { result })
}
