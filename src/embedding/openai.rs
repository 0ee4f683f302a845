//! OpenAI embeddings client
//!
//! Calls `POST {base_url}/embeddings` directly with reqwest.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{EmbeddingProvider, HOSTED_DIMENSIONS};
use crate::errors::{Result, SymbiontError};

/// Inputs sent per request
const BATCH_SIZE: usize = 64;

const PROVIDER: &str = "openai";

/// Hosted embedding backend
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: ErrorDetail,
}

#[derive(Deserialize)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
}

impl OpenAiEmbeddings {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(SymbiontError::embedding(PROVIDER, "API key must not be empty"));
        }

        let client = Client::builder().build().map_err(SymbiontError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);

        // The API rejects empty strings
        let input = texts
            .iter()
            .map(|t| if t.trim().is_empty() { " " } else { t.as_str() })
            .collect();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input,
            })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                SymbiontError::embedding(PROVIDER, format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SymbiontError::embedding(
                PROVIDER,
                format!("API returned {}: {}", status, detail),
            ));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            SymbiontError::embedding(PROVIDER, format!("failed to parse response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(SymbiontError::embedding(
                PROVIDER,
                format!("expected {} embeddings, got {}", texts.len(), parsed.data.len()),
            ));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| SymbiontError::embedding(PROVIDER, "API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            debug!(provider = PROVIDER, batch_size = chunk.len(), model = %self.model, "embedding batch");
            vectors.extend(self.request(chunk).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        HOSTED_DIMENSIONS
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
