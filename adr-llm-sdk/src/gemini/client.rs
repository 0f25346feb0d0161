use super::tools::GeminiToolFormat;
use super::types::*;
use crate::auth::TokenProvider;
use crate::error::LlmError;
use crate::tools::ProviderToolFormat;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;

/// How requests are authenticated and routed
enum GeminiAuth {
    /// Generative Language API with an API key
    ApiKey(String),
    /// Vertex AI with an OAuth bearer token
    Vertex {
        project: String,
        location: String,
        tokens: Arc<dyn TokenProvider>,
    },
}

/// Google Gemini API client
pub struct GeminiClient {
    auth: GeminiAuth,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Client for the Generative Language API
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        Ok(Self {
            auth: GeminiAuth::ApiKey(api_key),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: crate::models::gemini::GEMINI_2_5_FLASH_ID.to_string(),
            http_client: Self::http_client()?,
        })
    }

    /// Client for Vertex AI in the given project and region
    pub fn vertex(
        project: impl Into<String>,
        location: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, LlmError> {
        let project = project.into();
        let location = location.into();
        if project.is_empty() {
            return Err(LlmError::invalid_request(
                "Vertex AI requires a Google Cloud project",
            ));
        }
        if location.is_empty() {
            return Err(LlmError::invalid_request(
                "Vertex AI requires a Google Cloud location",
            ));
        }

        let base_url = if location == "global" {
            "https://aiplatform.googleapis.com".to_string()
        } else {
            format!("https://{}-aiplatform.googleapis.com", location)
        };

        Ok(Self {
            auth: GeminiAuth::Vertex {
                project,
                location,
                tokens,
            },
            base_url,
            model: crate::models::gemini::GEMINI_2_5_FLASH_ID.to_string(),
            http_client: Self::http_client()?,
        })
    }

    fn http_client() -> Result<reqwest::Client, LlmError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Network { source: e })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Default model reported by [`LlmClient::model_name`](crate::client::LlmClient::model_name)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        match &self.auth {
            GeminiAuth::ApiKey(_) => {
                format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
            }
            GeminiAuth::Vertex {
                project, location, ..
            } => format!(
                "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                self.base_url, project, location, model
            ),
        }
    }

    async fn auth_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        match &self.auth {
            GeminiAuth::ApiKey(api_key) => {
                headers.insert(
                    "x-goog-api-key",
                    HeaderValue::from_str(api_key).map_err(|e| {
                        LlmError::authentication(format!("Invalid API key format: {}", e))
                    })?,
                );
            }
            GeminiAuth::Vertex { tokens, .. } => {
                let token = tokens.access_token().await?;
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                        LlmError::authentication(format!("Invalid access token format: {}", e))
                    })?,
                );
            }
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub async fn generate_content(
        &self,
        model: impl Into<String>,
        request: GeminiGenerateContentRequest,
    ) -> Result<GeminiGenerateContentResponse, LlmError> {
        let model = model.into();
        let url = self.endpoint(&model);
        let headers = self.auth_headers().await?;

        tracing::debug!(model = %model, provider = self.provider_name(), "Sending generateContent request");

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network { source: e })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_body) {
                return Err(Self::map_error(
                    error_response.error.code,
                    error_response.error.message,
                ));
            }

            return Err(Self::map_error(status.as_u16(), error_body));
        }

        let generate_response = response
            .json::<GeminiGenerateContentResponse>()
            .await
            .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)))?;

        Ok(generate_response)
    }

    fn map_error(status: u16, message: String) -> LlmError {
        match status {
            400 => LlmError::invalid_request(message),
            401 | 403 => LlmError::Authentication { message },
            429 => LlmError::rate_limit(message, None),
            _ => LlmError::api_error(status, message),
        }
    }

    pub fn provider_name(&self) -> &str {
        match self.auth {
            GeminiAuth::ApiKey(_) => crate::providers::GOOGLE,
            GeminiAuth::Vertex { .. } => crate::providers::VERTEX_AI,
        }
    }
}

fn text_part(text: String) -> GeminiPart {
    GeminiPart {
        text: Some(text),
        ..Default::default()
    }
}

#[async_trait]
impl crate::client::LlmClient for GeminiClient {
    async fn complete(
        &self,
        request: crate::types::CompletionRequest,
    ) -> Result<crate::types::CompletionResponse, LlmError> {
        let contents = request
            .messages
            .into_iter()
            .map(|msg| {
                let role = match msg.role {
                    crate::types::Role::User => GeminiRole::User,
                    crate::types::Role::Assistant => GeminiRole::Model,
                    crate::types::Role::System => {
                        return Err(LlmError::invalid_request(
                            "System messages should be provided via the system parameter",
                        ));
                    }
                };

                let parts = msg
                    .content
                    .into_iter()
                    .map(|block| match block {
                        crate::types::ContentBlock::Text { text } => text_part(text),
                    })
                    .collect();

                Ok(GeminiContent { role, parts })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // All function declarations go into a single tool entry
        let tools = request.tools.and_then(|tools| {
            let declarations: Vec<GeminiFunctionDeclaration> = tools
                .iter()
                .filter_map(|tool| GeminiToolFormat::to_provider_tool(tool).function_declarations)
                .flatten()
                .collect();
            if declarations.is_empty() {
                None
            } else {
                Some(vec![GeminiTool {
                    function_declarations: Some(declarations),
                }])
            }
        });

        let tool_config = request
            .tool_choice
            .map(|choice| {
                serde_json::from_value::<GeminiToolConfig>(
                    GeminiToolFormat::to_provider_tool_choice(&choice),
                )
            })
            .transpose()?;

        let gemini_request = GeminiGenerateContentRequest {
            contents,
            system_instruction: request.system.map(|text| GeminiContent {
                role: GeminiRole::User,
                parts: vec![text_part(text)],
            }),
            tools,
            tool_config,
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                max_output_tokens: Some(request.max_tokens),
                stop_sequences: request.stop_sequences,
                ..Default::default()
            }),
        };

        let gemini_response = self.generate_content(request.model, gemini_request).await?;

        let candidate = gemini_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::internal("No candidates returned"))?;

        let mut content = Vec::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought.unwrap_or(false) {
                continue;
            }
            if let Some(text) = part.text {
                content.push(crate::types::ContentBlock::Text { text });
            }
            if let Some(call) = part.function_call {
                // Gemini does not assign ids to function calls
                let id = format!("call_{}", tool_calls.len());
                tool_calls.push(crate::tools::ToolCall::new(id, call.name, call.args));
            }
        }

        let usage = gemini_response
            .usage_metadata
            .map(|u| crate::types::Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(crate::types::CompletionResponse {
            content,
            role: crate::types::Role::Assistant,
            usage,
            stop_reason: candidate.finish_reason,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
        })
    }

    fn provider_name(&self) -> &str {
        GeminiClient::provider_name(self)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::client::LlmClient;
    use crate::types::{CompletionRequest, ContentBlock, Message};
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct LookupParams {
        query: String,
    }

    fn request_with_tool(model: &str) -> CompletionRequest {
        CompletionRequest {
            messages: vec![Message::user("Which drugs cause headache?")],
            max_tokens: 512,
            model: model.to_string(),
            system: Some("You are a pharmacist.".to_string()),
            temperature: Some(0.2),
            top_p: None,
            stop_sequences: None,
            tools: Some(vec![crate::tools::Tool::from_type::<LookupParams>()
                .name("lookup")
                .description("Look up medications")
                .build()]),
            tool_choice: Some(crate::tools::ToolChoice::Auto),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key");
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_creation_empty_key() {
        let client = GeminiClient::new("");
        assert!(client.is_err());
    }

    #[test]
    fn test_vertex_endpoint() {
        let client = GeminiClient::vertex(
            "adr-project",
            "europe-west1",
            Arc::new(StaticTokenProvider::new("token")),
        )
        .unwrap();

        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://europe-west1-aiplatform.googleapis.com/v1/projects/adr-project/locations/europe-west1/publishers/google/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.provider_name(), "vertex_ai");
    }

    #[tokio::test]
    async fn test_complete_maps_function_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "You are a pharmacist."}]},
                "toolConfig": {"functionCallingConfig": {"mode": "AUTO"}}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [
                                {"text": "Let me check."},
                                {"functionCall": {"name": "lookup", "args": {"query": "headache"}}}
                            ]
                        },
                        "finishReason": "STOP",
                        "index": 0
                    }],
                    "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 7, "totalTokenCount": 19},
                    "modelVersion": "gemini-2.5-flash"
                }"#,
            )
            .create_async()
            .await;

        let client = GeminiClient::new("test-key")
            .unwrap()
            .with_base_url(server.url());
        let response = client
            .complete(request_with_tool("gemini-2.5-flash"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            response.content,
            vec![ContentBlock::Text {
                text: "Let me check.".to_string()
            }]
        );
        let calls = response.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name(), "lookup");
        assert_eq!(calls[0].id(), "call_0");
        assert_eq!(calls[0].raw_arguments()["query"], "headache");
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 7);
    }

    #[tokio::test]
    async fn test_vertex_uses_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1/projects/adr-project/locations/europe-west1/publishers/google/models/gemini-2.5-flash:generateContent",
            )
            .match_header("authorization", "Bearer ya29.test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Done"}]},"finishReason":"STOP"}]}"#)
            .create_async()
            .await;

        let client = GeminiClient::vertex(
            "adr-project",
            "europe-west1",
            Arc::new(StaticTokenProvider::new("ya29.test")),
        )
        .unwrap()
        .with_base_url(server.url());

        let response = client
            .complete(request_with_tool("gemini-2.5-flash"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.tool_calls.is_none());
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new("test-key")
            .unwrap()
            .with_base_url(server.url());
        let err = client
            .complete(request_with_tool("gemini-2.5-flash"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RateLimit { .. }));
    }

    #[tokio::test]
    async fn test_system_role_is_rejected() {
        let client = GeminiClient::new("test-key").unwrap();
        let mut request = request_with_tool("gemini-2.5-flash");
        request.messages.push(Message::system("inline system"));

        let err = client.complete(request).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest { .. }));
    }
}
