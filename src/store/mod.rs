//! Vector store access
//!
//! The store is an external service; this module only defines the
//! operations the pipeline needs and a Qdrant implementation of them.

pub mod qdrant;

use async_trait::async_trait;

use crate::document::{Document, ScoredDocument};
use crate::errors::Result;

pub use qdrant::QdrantStore;

/// A document with its identifier and embedding, ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub document: Document,
}

/// Named collections of vectors with cosine similarity search
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Whether a collection with this name exists
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Vector size of an existing collection, `None` if it cannot be determined
    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>>;

    /// Create a cosine-distance collection of the given vector size
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Insert points, replacing any with the same id
    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<()>;

    /// The `limit` nearest documents, most similar first
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>>;
}
