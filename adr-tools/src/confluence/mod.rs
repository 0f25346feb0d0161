//! `create_confluence_page` - documents an adverse drug reaction as a Confluence page

use crate::secrets::{SecretStore, SecretVersion};
use crate::tool_error::ToolError;
use crate::types::{AdverseEventReport, CreateConfluencePageResponse, ToolResponse};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt::Display;

mod client;

pub use client::{BasicCredentials, ConfluenceApi, ConfluenceClient, CreatePageRequest};

pub const CREATE_FAILED: &str = "Failed to create Confluence page.";

pub const DEFAULT_BASE_URL: &str = "https://compeople.atlassian.net/wiki";
pub const DEFAULT_SPACE_KEY: &str = "GC";
pub const DEFAULT_PARENT_PAGE_ID: &str = "389185556";

/// Rendered page title and storage-format body
#[derive(Debug, Clone, PartialEq)]
pub struct ConfluencePage {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ConfluenceSettings {
    pub project_id: String,
    pub base_url: String,
    pub space_key: String,
    pub parent_page_id: Option<String>,
    pub username: Option<String>,
    pub secret_id: Option<String>,
    pub secret_version: Option<String>,
}

impl Default for ConfluenceSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            space_key: DEFAULT_SPACE_KEY.to_string(),
            parent_page_id: Some(DEFAULT_PARENT_PAGE_ID.to_string()),
            username: None,
            secret_id: None,
            secret_version: None,
        }
    }
}

fn cell<T: Display>(value: Option<&T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn list_cell(values: Option<&Vec<String>>) -> String {
    values.map(|v| v.join(", ")).unwrap_or_default()
}

/// Builds the title and record table for a report
pub fn build_page(report: &AdverseEventReport, now: &DateTime<Local>) -> ConfluencePage {
    let title = format!(
        "Adverse Drug Reaction: {} - {}",
        report.medication,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    let rows = [
        ("Medication", report.medication.clone()),
        ("Side Effect", report.side_effect.clone()),
        ("Dose", cell(report.dose.as_ref())),
        ("Intake Duration", cell(report.intake_duration.as_ref())),
        (
            "Side Effect Intensity",
            cell(report.side_effect_intensity.as_ref()),
        ),
        ("Symptoms", cell(report.symptoms.as_ref())),
        ("Other Medications", list_cell(report.other_medications.as_ref())),
        ("Taken With Meal", cell(report.taken_with_meal.as_ref())),
        ("Age of Patient", cell(report.age_of_patient.as_ref())),
        ("Weight of Patient", cell(report.weight_of_patient.as_ref())),
        ("Gender of Patient", cell(report.gender_of_patient.as_ref())),
        (
            "Underlying Conditions",
            list_cell(report.underlying_condition.as_ref()),
        ),
        ("Known Allergies", list_cell(report.known_allergies.as_ref())),
    ];

    let mut body = String::from(
        "<h2>Record of Side Effects</h2>\n<table border=\"1\" cellpadding=\"5\" cellspacing=\"0\">\n",
    );
    for (label, value) in rows {
        body.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            label,
            html_escape::encode_safe(&value)
        ));
    }
    body.push_str("</table>");

    ConfluencePage { title, body }
}

/// `None`, `null`, `false`, `""`, `[]` and `{}` count as no page created
pub fn is_falsy(created: Option<&Value>) -> bool {
    match created {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Number(_)) => false,
    }
}

/// Absolute page URL from the created content's `_links.webui`
pub fn page_url(base_url: &str, created: &Value) -> Result<String, ToolError> {
    let webui = created
        .pointer("/_links/webui")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ToolError::ExecutionError("Created page has no _links.webui".to_string())
        })?;
    Ok(format!("{}{}", base_url.trim_end_matches('/'), webui))
}

/// Main entry point for `create_confluence_page`
pub async fn execute_create_confluence_page(
    report: AdverseEventReport,
    settings: &ConfluenceSettings,
    secrets: &dyn SecretStore,
    api: &dyn ConfluenceApi,
) -> Result<ToolResponse, ToolError> {
    let page = build_page(&report, &Local::now());

    let username = settings
        .username
        .clone()
        .ok_or_else(|| ToolError::MissingConfig("CONFLUENCE_USERNAME is not set".to_string()))?;
    let secret_id = settings
        .secret_id
        .as_deref()
        .ok_or_else(|| ToolError::MissingConfig("CONFLUENCE_SECRET_ID is not set".to_string()))?;
    let secret_version = settings.secret_version.as_deref().ok_or_else(|| {
        ToolError::MissingConfig("CONFLUENCE_SECRET_VERSION is not set".to_string())
    })?;

    let password = secrets
        .access(&SecretVersion::new(
            &settings.project_id,
            secret_id,
            secret_version,
        ))
        .await?;

    let created = api
        .create_page(
            &BasicCredentials { username, password },
            &CreatePageRequest {
                space_key: settings.space_key.clone(),
                title: page.title,
                body: page.body,
                parent_id: settings.parent_page_id.clone(),
            },
        )
        .await?;

    let created = match created {
        Some(value) if !is_falsy(Some(&value)) => value,
        _ => {
            tracing::warn!(medication = %report.medication, "Confluence returned no page");
            return Ok(ToolResponse::CreateConfluencePage(
                CreateConfluencePageResponse {
                    message: CREATE_FAILED.to_string(),
                    url: None,
                },
            ));
        }
    };

    let url = page_url(api.base_url(), &created)?;
    tracing::info!(url = %url, "Confluence page created");

    Ok(ToolResponse::CreateConfluencePage(
        CreateConfluencePageResponse {
            message: format!("Confluence page created at url: {}, ", url),
            url: Some(url),
        },
    ))
}
