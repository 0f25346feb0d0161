use crate::tool_error::ToolError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A page to create in storage representation
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePageRequest {
    pub space_key: String,
    pub title: String,
    pub body: String,
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
struct ContentBody<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    title: &'a str,
    space: SpaceRef<'a>,
    body: StorageBody<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ancestors: Vec<Ancestor<'a>>,
}

#[derive(Serialize)]
struct SpaceRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct StorageBody<'a> {
    storage: StorageValue<'a>,
}

#[derive(Serialize)]
struct StorageValue<'a> {
    value: &'a str,
    representation: &'static str,
}

#[derive(Serialize)]
struct Ancestor<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    id: &'a str,
}

impl<'a> From<&'a CreatePageRequest> for ContentBody<'a> {
    fn from(page: &'a CreatePageRequest) -> Self {
        Self {
            content_type: "page",
            title: &page.title,
            space: SpaceRef {
                key: &page.space_key,
            },
            body: StorageBody {
                storage: StorageValue {
                    value: &page.body,
                    representation: "storage",
                },
            },
            ancestors: page
                .parent_id
                .as_deref()
                .map(|id| {
                    vec![Ancestor {
                        content_type: "page",
                        id,
                    }]
                })
                .unwrap_or_default(),
        }
    }
}

/// Confluence content API, bound to one site
#[async_trait]
pub trait ConfluenceApi: Send + Sync {
    /// Site root that relative `_links` are resolved against
    fn base_url(&self) -> &str;

    /// Returns the created content as JSON, or `None` when the server sent no body
    async fn create_page(
        &self,
        credentials: &BasicCredentials,
        page: &CreatePageRequest,
    ) -> Result<Option<Value>, ToolError>;
}

/// Confluence REST client (`/rest/api/content`)
pub struct ConfluenceClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ConfluenceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ConfluenceApi for ConfluenceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create_page(
        &self,
        credentials: &BasicCredentials,
        page: &CreatePageRequest,
    ) -> Result<Option<Value>, ToolError> {
        let url = format!("{}/rest/api/content/", self.base_url);

        tracing::debug!(space = %page.space_key, title = %page.title, "Creating Confluence page");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .json(&ContentBody::from(page))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ToolError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&text)?))
    }
}
