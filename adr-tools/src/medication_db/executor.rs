//! PostgreSQL access for the medication tool
//!
//! One connection per query, closed again whether the query succeeds or fails. Queries run over
//! the simple query protocol, so every value arrives in PostgreSQL's own text form.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{Connection, Executor, PgConnection, Row};
use std::fmt;

/// Text shown for SQL NULL
pub const NULL_TEXT: &str = "NULL";

#[derive(Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl ConnectionSettings {
    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .password(&self.password);
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        options
    }
}

/// Runs a vetted query and returns every row as rendered column values
#[async_trait]
pub trait MedicationDatabase: Send + Sync {
    async fn fetch_rows(
        &self,
        connection: &ConnectionSettings,
        query: &str,
    ) -> anyhow::Result<Vec<Vec<String>>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresMedicationDatabase;

impl PostgresMedicationDatabase {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MedicationDatabase for PostgresMedicationDatabase {
    async fn fetch_rows(
        &self,
        connection: &ConnectionSettings,
        query: &str,
    ) -> anyhow::Result<Vec<Vec<String>>> {
        let mut conn = PgConnection::connect_with(&connection.connect_options()).await?;

        let result = conn.fetch_all(sqlx::raw_sql(query)).await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close medication database connection");
        }

        let rows = result?;
        tracing::debug!(row_count = rows.len(), "Medication query finished");

        rows.iter().map(render_row).collect()
    }
}

fn render_row(row: &PgRow) -> anyhow::Result<Vec<String>> {
    (0..row.len())
        .map(|index| {
            let value: Option<String> = row.try_get_unchecked(index)?;
            Ok(value.unwrap_or_else(|| NULL_TEXT.to_string()))
        })
        .collect()
}

/// Connection settings for tests that need a real database: MEDICATION_DB_HOST,
/// MEDICATION_DB_PORT, MEDICATION_DB_NAME, MEDICATION_DB_USER and MEDICATION_DB_PASSWORD.
#[cfg(test)]
pub(crate) fn test_connection_settings() -> ConnectionSettings {
    ConnectionSettings {
        host: std::env::var("MEDICATION_DB_HOST").unwrap_or_else(|_| "localhost".into()),
        port: std::env::var("MEDICATION_DB_PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(5432),
        database: std::env::var("MEDICATION_DB_NAME")
            .unwrap_or_else(|_| "medicine_details".to_string()),
        user: std::env::var("MEDICATION_DB_USER").ok(),
        password: std::env::var("MEDICATION_DB_PASSWORD").unwrap_or_default(),
    }
}
