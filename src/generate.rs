//! Answer generation via the OpenAI chat completions API.
//!
//! Wraps the retrieved context and the user's question in a grounding
//! prompt that instructs the model to answer from the context alone, and
//! sends it with a low sampling temperature so answers stay literal
//! rather than creative. No retry; provider failures propagate.

use reqwest::Client;
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{PipelineError, Result};

/// Client for the chat completions endpoint.
pub struct ChatClient {
    http: Client,
    api_key: String,
    model: String,
    temperature: f64,
    api_base: String,
}

impl ChatClient {
    /// Create a client from configuration. The API key is read from the
    /// `OPENAI_API_KEY` environment variable.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PipelineError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::GenerationProvider(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: config.chat_model.clone(),
            temperature: config.temperature,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Generate an answer to `query` grounded in `context`.
    ///
    /// Returns the trimmed response text.
    pub async fn generate(&self, query: &str, context: &str) -> Result<String> {
        let prompt = build_prompt(query, context);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [ { "role": "user", "content": prompt } ],
            "temperature": self.temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::GenerationProvider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::GenerationProvider(format!(
                "API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::GenerationProvider(e.to_string()))?;

        parse_chat_response(&json)
    }
}

/// Build the grounding prompt with context and question embedded verbatim.
fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are a helpful assistant. Answer the user's question based only on the context below.\n\
         Context:\n{}\n\n\
         Question: {}\n\
         Answer:",
        context, query
    )
}

/// Extract `choices[0].message.content` from a chat completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    let content = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            PipelineError::GenerationProvider(
                "invalid response: missing choices[0].message.content".to_string(),
            )
        })?;

    Ok(content.trim().to_string())
}
