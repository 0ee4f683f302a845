//! End-to-end retrieval pipeline
//!
//! Owns the collaborators for one run (vector store, embedder, optional
//! LLM) and drives the ingest-once-then-query workflow:
//!
//! 1. `bootstrap`: create and fill the collection if it does not exist
//! 2. `search`: embed the query and fetch the k nearest documents
//! 3. `absorb`: fold retrieved text into the session context
//! 4. `generate`: render the prompt and ask the LLM

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::document::ScoredDocument;
use crate::embedding::EmbeddingProvider;
use crate::errors::{Result, SymbiontError};
use crate::llm::LanguageModel;
use crate::loader::DocumentSource;
use crate::rag::context::{ContextScope, SessionContext};
use crate::rag::prompt::PromptTemplate;
use crate::store::{StoredPoint, VectorStore};

/// What `bootstrap` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapReport {
    /// Collection was already present; nothing was loaded
    Existing,
    /// Collection was created and filled
    Created { documents: usize },
}

/// Retrieval-augmented question answering over one collection
pub struct RagPipeline {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Option<Arc<dyn LanguageModel>>,
    prompt: PromptTemplate,
    context: SessionContext,
    collection: String,
    k: usize,
}

impl RagPipeline {
    /// Assemble a pipeline. `llm` is `None` when LLM responses are disabled.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LanguageModel>>,
        collection: impl Into<String>,
        k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            prompt: PromptTemplate::default(),
            context: SessionContext::new(ContextScope::Session),
            collection: collection.into(),
            k: k.max(1),
        }
    }

    /// Build from resolved settings
    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LanguageModel>>,
    ) -> Self {
        let llm = if settings.llm_response { llm } else { None };
        Self::new(store, embedder, llm, settings.collection_name.clone(), settings.k)
            .with_prompt(PromptTemplate::new(settings.base_prompt.clone()))
            .with_context_scope(settings.context_scope)
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_context_scope(mut self, scope: ContextScope) -> Self {
        self.context = SessionContext::new(scope);
        self
    }

    /// Make sure the collection exists, ingesting documents only on creation.
    ///
    /// An existing collection must hold vectors of the embedder's size.
    ///
    /// Documents are loaded and embedded before the collection is created,
    /// so a loader or embedding failure never leaves an empty collection
    /// behind that later runs would treat as already ingested.
    pub async fn bootstrap(&self, loader: &dyn DocumentSource) -> Result<BootstrapReport> {
        if self.store.collection_exists(&self.collection).await? {
            let expected = self.embedder.dimensions();
            match self.store.collection_dimensions(&self.collection).await? {
                Some(actual) if actual != expected => {
                    return Err(SymbiontError::ConfigurationError(format!(
                        "collection '{}' holds {}-dimensional vectors but the {} embedding backend produces {}; \
                         use the backend it was created with or a new collection name",
                        self.collection,
                        actual,
                        self.embedder.name(),
                        expected
                    )));
                }
                Some(_) => {}
                None => warn!(collection = %self.collection, "could not read collection vector size"),
            }

            info!(collection = %self.collection, "collection exists, skipping ingestion");
            return Ok(BootstrapReport::Existing);
        }

        info!(collection = %self.collection, "Creating collection...");

        let documents = loader.load()?;
        if documents.is_empty() {
            warn!(collection = %self.collection, "no documents found to ingest");
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let dimensions = self.embedder.dimensions();
        if vectors.len() != documents.len() {
            return Err(SymbiontError::embedding(
                self.embedder.name(),
                format!("expected {} vectors, got {}", documents.len(), vectors.len()),
            ));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(SymbiontError::embedding(
                self.embedder.name(),
                format!("vector has {} dimensions, collection expects {}", bad.len(), dimensions),
            ));
        }

        let points: Vec<StoredPoint> = documents
            .into_iter()
            .zip(vectors)
            .map(|(document, vector)| StoredPoint {
                id: Uuid::new_v4().to_string(),
                vector,
                document,
            })
            .collect();
        let count = points.len();

        self.store.create_collection(&self.collection, dimensions).await?;
        self.store.upsert(&self.collection, points).await?;

        info!(collection = %self.collection, documents = count, dimensions, "ingestion complete");
        Ok(BootstrapReport::Created { documents: count })
    }

    /// The k documents most similar to `query`, most similar first
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(SymbiontError::into_retrieval)?;

        let results = self
            .store
            .search(&self.collection, &vector, self.k)
            .await
            .map_err(SymbiontError::into_retrieval)?;

        debug!(query, returned = results.len(), k = self.k, "similarity search");
        Ok(rank(results, self.k))
    }

    /// Called at the start of every query
    pub fn begin_query(&mut self) {
        self.context.begin_query();
    }

    /// Fold retrieved documents into the session context
    pub fn absorb(&mut self, results: &[ScoredDocument]) {
        for result in results {
            self.context.absorb(result);
        }
    }

    /// The prompt that would be sent for `question` right now
    pub fn build_prompt(&self, question: &str) -> String {
        self.prompt.render(self.context.as_str(), question)
    }

    /// Ask the LLM about `question` using the accumulated context.
    ///
    /// Returns `Ok(None)` when LLM responses are disabled.
    pub async fn generate(&self, question: &str) -> Result<Option<String>> {
        let Some(llm) = &self.llm else {
            return Ok(None);
        };

        let prompt = self.build_prompt(question);
        debug!(model = llm.model_name(), context_docs = self.context.document_count(), "generating answer");

        llm.complete(&prompt).await.map(Some).map_err(|e| match e {
            e @ SymbiontError::GenerationError(_) => e,
            other => SymbiontError::GenerationError(other.to_string()),
        })
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Name of the chat model, if LLM responses are enabled
    pub fn model_name(&self) -> Option<&str> {
        self.llm.as_ref().map(|llm| llm.model_name())
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

/// Order by descending score and keep at most `k`
pub fn rank(mut results: Vec<ScoredDocument>, k: usize) -> Vec<ScoredDocument> {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn hit(text: &str, score: f32) -> ScoredDocument {
        ScoredDocument {
            document: Document::new(text),
            score,
        }
    }

    #[test]
    fn test_rank_truncates_and_orders() {
        let results = vec![
            hit("c", 0.2),
            hit("a", 0.9),
            hit("e", 0.1),
            hit("b", 0.5),
            hit("d", 0.3),
        ];
        let ranked = rank(results, 3);
        let texts: Vec<_> = ranked.iter().map(|r| r.document.page_content.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_rank_fewer_than_k() {
        let ranked = rank(vec![hit("only", 0.4)], 3);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_rank_keeps_ties_stable() {
        let ranked = rank(vec![hit("first", 0.5), hit("second", 0.5)], 2);
        assert_eq!(ranked[0].document.page_content, "first");
        assert_eq!(ranked[1].document.page_content, "second");
    }
}
