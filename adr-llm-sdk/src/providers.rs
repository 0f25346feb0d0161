//! Provider name constants

/// Google Generative Language API (API key)
pub const GOOGLE: &str = "google";

/// Google Vertex AI (OAuth access token)
pub const VERTEX_AI: &str = "vertex_ai";
