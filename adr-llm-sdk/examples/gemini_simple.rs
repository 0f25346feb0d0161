//! Simple Gemini 2.5 Flash example
//!
//! Run with: GEMINI_API_KEY="..." cargo run --example gemini_simple

use adr_llm_sdk::client::LlmClient;
use adr_llm_sdk::gemini::{GeminiClient, GEMINI_2_5_FLASH};
use adr_llm_sdk::types::{CompletionRequest, ContentBlock, Message};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("GEMINI_API_KEY")?;
    let client = GeminiClient::new(api_key)?;

    println!("=== Gemini 2.5 Flash Example ===\n");

    let response = client
        .complete(CompletionRequest {
            messages: vec![Message::user(
                "Which side effects are common for ibuprofen?",
            )],
            max_tokens: 512,
            model: GEMINI_2_5_FLASH.to_string(),
            system: Some("You are a pharmacist. Answer briefly.".to_string()),
            temperature: Some(0.2),
            top_p: None,
            stop_sequences: None,
            tools: None,
            tool_choice: None,
        })
        .await?;

    println!("Provider: {}", client.provider_name());
    println!("\nResponse:");
    for ContentBlock::Text { text } in &response.content {
        println!("{}", text);
    }

    println!("\n=== Token Usage ===");
    println!("Input: {}", response.usage.input_tokens);
    println!("Output: {}", response.usage.output_tokens);

    Ok(())
}
