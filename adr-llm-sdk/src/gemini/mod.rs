//! Google Gemini API client and types
//!
//! Supports the Generative Language API (API key) and Vertex AI (OAuth access token).

pub mod client;
pub mod tools;
pub mod types;

pub use client::GeminiClient;
pub use tools::GeminiToolFormat;
pub use types::*;

pub use crate::models::gemini::*;
