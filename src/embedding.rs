//! Embedding service backed by the OpenAI embeddings API.
//!
//! Converts chunk or query text into fixed-dimension `f32` vectors.
//! Blank entries are dropped before any request is made — the provider
//! rejects empty input — and requests are batched to stay under the
//! provider's per-call item limit. Batches run strictly one after the
//! other; results are concatenated in input order.
//!
//! There is no retry or backoff here. A failed batch fails the whole
//! call and the caller decides what to do with it.

use reqwest::Client;
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{PipelineError, Result};

/// Provider limit on items per embeddings request. Also used by the
/// `stats` command to estimate batch counts.
pub const MAX_BATCH_ITEMS: usize = 100;

/// Client for the embeddings endpoint, constructed from explicit
/// configuration rather than process-global state.
pub struct EmbeddingClient {
    http: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl EmbeddingClient {
    /// Create a client from configuration. The API key is read from the
    /// `OPENAI_API_KEY` environment variable.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PipelineError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::EmbeddingProvider(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: config.embedding_model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Embed a batch of texts, in order.
    ///
    /// Blank entries are skipped, so the output can be shorter than the
    /// input. Callers that rely on positional alignment with the corpus
    /// must pass only non-blank texts (the corpus builder guarantees
    /// this for corpus chunks).
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let clean = non_blank(texts);
        let mut embeddings = Vec::with_capacity(clean.len());

        for batch in clean.chunks(MAX_BATCH_ITEMS) {
            let vectors = self.embed_batch(batch).await?;
            if vectors.len() != batch.len() {
                return Err(PipelineError::EmbeddingProvider(format!(
                    "provider returned {} embeddings for {} inputs",
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed(&[text.to_string()]).await?;
        results.into_iter().next().ok_or_else(|| {
            PipelineError::EmbeddingProvider("empty embedding response for query".to_string())
        })
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": batch,
        });

        let response = self
            .http
            .post(format!("{}/embeddings", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::EmbeddingProvider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::EmbeddingProvider(format!(
                "API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::EmbeddingProvider(e.to_string()))?;

        parse_embeddings_response(&json)
    }
}

/// Extract `data[].embedding` arrays from an embeddings API response,
/// in response order (the provider returns them in input order).
fn parse_embeddings_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json.get("data").and_then(|d| d.as_array()).ok_or_else(|| {
        PipelineError::EmbeddingProvider("invalid response: missing data array".to_string())
    })?;

    let mut embeddings = Vec::with_capacity(data.len());

    for item in data {
        let values = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| {
                PipelineError::EmbeddingProvider(
                    "invalid response: missing embedding field".to_string(),
                )
            })?;

        let vector: Vec<f32> = values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        embeddings.push(vector);
    }

    Ok(embeddings)
}

/// Drop empty and whitespace-only entries, preserving order.
fn non_blank(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .collect()
}
