//! Embedding providers
//!
//! Two interchangeable backends turn text into vectors:
//! - Hosted: OpenAI embeddings API (1536 dimensions)
//! - Local: MiniLM sentence transformer run through Candle (384 dimensions)
//!
//! The backend is chosen once from the presence of an API credential and
//! never changes during a session; a collection only ever receives vectors
//! of one dimensionality.

pub mod local;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::errors::{Result, SymbiontError};

pub use local::LocalEmbeddings;
pub use openai::OpenAiEmbeddings;

/// Dimensionality of `text-embedding-ada-002` vectors
pub const HOSTED_DIMENSIONS: usize = 1536;

/// Dimensionality of `all-MiniLM-L6-v2` vectors
pub const LOCAL_DIMENSIONS: usize = 384;

/// Anything that can turn text into a fixed-length vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every vector this provider returns
    fn dimensions(&self) -> usize;

    /// Short name used in logs and errors
    fn name(&self) -> &str;
}

/// Which backend a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    Hosted,
    Local,
}

impl EmbeddingKind {
    /// Hosted when a credential is available, local otherwise
    pub fn select(credential: Option<&str>) -> Self {
        match credential {
            Some(key) if !key.trim().is_empty() => EmbeddingKind::Hosted,
            _ => EmbeddingKind::Local,
        }
    }

    /// Vector size produced by this backend
    pub fn dimensions(&self) -> usize {
        match self {
            EmbeddingKind::Hosted => HOSTED_DIMENSIONS,
            EmbeddingKind::Local => LOCAL_DIMENSIONS,
        }
    }
}

/// The selected backend
pub enum EmbeddingBackend {
    Hosted(OpenAiEmbeddings),
    Local(LocalEmbeddings),
}

impl EmbeddingBackend {
    /// Build the backend named by `settings.embedding_kind`.
    ///
    /// The local model is downloaded and loaded on a blocking thread.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let backend = match settings.embedding_kind {
            EmbeddingKind::Hosted => EmbeddingBackend::Hosted(OpenAiEmbeddings::new(
                &settings.openai_base_url,
                &settings.api_key,
                &settings.embedding_model,
            )?),
            EmbeddingKind::Local => {
                let model = tokio::task::spawn_blocking(LocalEmbeddings::new)
                    .await
                    .map_err(|e| SymbiontError::embedding("local", e.to_string()))??;
                EmbeddingBackend::Local(model)
            }
        };

        info!(
            provider = backend.name(),
            dimensions = backend.dimensions(),
            "embedding backend ready"
        );
        Ok(backend)
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            EmbeddingBackend::Hosted(p) => p.embed(text).await,
            EmbeddingBackend::Local(p) => p.embed(text).await,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            EmbeddingBackend::Hosted(p) => p.embed_batch(texts).await,
            EmbeddingBackend::Local(p) => p.embed_batch(texts).await,
        }
    }

    fn dimensions(&self) -> usize {
        match self {
            EmbeddingBackend::Hosted(p) => p.dimensions(),
            EmbeddingBackend::Local(p) => p.dimensions(),
        }
    }

    fn name(&self) -> &str {
        match self {
            EmbeddingBackend::Hosted(p) => p.name(),
            EmbeddingBackend::Local(p) => p.name(),
        }
    }
}
