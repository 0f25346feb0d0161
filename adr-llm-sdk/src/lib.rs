//! # ADR LLM SDK
//!
//! A small provider-agnostic LLM SDK. Gemini is the only provider; it can be reached either
//! through the Generative Language API (API key) or Vertex AI (OAuth access token).
//!
//! ## Example
//!
//! ```rust,no_run
//! use adr_llm_sdk::client::LlmClient;
//! use adr_llm_sdk::gemini::{GeminiClient, GEMINI_2_5_FLASH};
//! use adr_llm_sdk::types::{CompletionRequest, ContentBlock, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new("your-gemini-api-key")?;
//!     let response = client
//!         .complete(CompletionRequest {
//!             messages: vec![Message::user("Hello, Gemini!")],
//!             max_tokens: 256,
//!             model: GEMINI_2_5_FLASH.to_string(),
//!             system: None,
//!             temperature: None,
//!             top_p: None,
//!             stop_sequences: None,
//!             tools: None,
//!             tool_choice: None,
//!         })
//!         .await?;
//!
//!     for ContentBlock::Text { text } in &response.content {
//!         println!("Response: {}", text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Vertex AI Example
//!
//! ```rust,no_run
//! use adr_llm_sdk::auth::MetadataServerTokenProvider;
//! use adr_llm_sdk::gemini::GeminiClient;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = Arc::new(MetadataServerTokenProvider::new()?);
//! let client = GeminiClient::vertex("my-project", "europe-west1", tokens)?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod gemini;
pub mod models;
pub mod providers;
pub mod tools;
pub mod types;
