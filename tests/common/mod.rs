//! In-memory collaborators that count how they are used

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use symbiont::document::{Document, ScoredDocument};
use symbiont::embedding::EmbeddingProvider;
use symbiont::errors::{Result, SymbiontError};
use symbiont::llm::LanguageModel;
use symbiont::loader::DocumentSource;
use symbiont::store::{StoredPoint, VectorStore};

/// Vector store that keeps points in memory and returns canned search results
#[derive(Default)]
pub struct FakeStore {
    pub exists: Mutex<bool>,
    pub create_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub created_dimensions: Mutex<Option<usize>>,
    pub points: Mutex<Vec<StoredPoint>>,
    pub results: Mutex<Vec<ScoredDocument>>,
    pub fail_search: Mutex<bool>,
    pub fail_exists: Mutex<bool>,
    pub fail_create: Mutex<bool>,
    pub fail_upsert: Mutex<bool>,
    /// Vector size reported for an existing collection
    pub dimensions: Mutex<Option<usize>>,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn existing() -> Arc<Self> {
        let store = Self::default();
        *store.exists.lock().unwrap() = true;
        Arc::new(store)
    }

    /// An existing collection holding vectors of `dims` components
    pub fn existing_with_dimensions(dims: usize) -> Arc<Self> {
        let store = Self::existing();
        *store.dimensions.lock().unwrap() = Some(dims);
        store
    }

    pub fn failing_exists(self: Arc<Self>) -> Arc<Self> {
        *self.fail_exists.lock().unwrap() = true;
        self
    }

    pub fn failing_create(self: Arc<Self>) -> Arc<Self> {
        *self.fail_create.lock().unwrap() = true;
        self
    }

    pub fn failing_upsert(self: Arc<Self>) -> Arc<Self> {
        *self.fail_upsert.lock().unwrap() = true;
        self
    }

    pub fn with_results(self: Arc<Self>, results: Vec<ScoredDocument>) -> Arc<Self> {
        *self.results.lock().unwrap() = results;
        self
    }

    pub fn failing_search(self: Arc<Self>) -> Arc<Self> {
        *self.fail_search.lock().unwrap() = true;
        self
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn collection_exists(&self, _name: &str) -> Result<bool> {
        if *self.fail_exists.lock().unwrap() {
            return Err(SymbiontError::StoreError("connection refused".to_string()));
        }
        Ok(*self.exists.lock().unwrap())
    }

    async fn collection_dimensions(&self, _name: &str) -> Result<Option<usize>> {
        let reported = *self.dimensions.lock().unwrap();
        Ok(reported.or(*self.created_dimensions.lock().unwrap()))
    }

    async fn create_collection(&self, _name: &str, dimensions: usize) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_create.lock().unwrap() {
            return Err(SymbiontError::StoreError("collection creation rejected".to_string()));
        }
        *self.created_dimensions.lock().unwrap() = Some(dimensions);
        *self.exists.lock().unwrap() = true;
        Ok(())
    }

    async fn upsert(&self, _collection: &str, points: Vec<StoredPoint>) -> Result<()> {
        if *self.fail_upsert.lock().unwrap() {
            return Err(SymbiontError::StoreError("upsert timed out".to_string()));
        }
        self.points.lock().unwrap().extend(points);
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        _vector: &[f32],
        _limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_search.lock().unwrap() {
            return Err(SymbiontError::StoreError("connection refused".to_string()));
        }

        let canned = self.results.lock().unwrap().clone();
        if !canned.is_empty() {
            return Ok(canned);
        }

        // Fall back to whatever was ingested, scored by position
        let points = self.points.lock().unwrap();
        Ok(points
            .iter()
            .enumerate()
            .map(|(i, p)| ScoredDocument {
                document: p.document.clone(),
                score: 1.0 - i as f32 * 0.01,
            })
            .collect())
    }
}

/// Embedder returning constant vectors of a fixed size
pub struct FakeEmbedder {
    pub dims: usize,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new(dims: usize) -> Arc<Self> {
        Arc::new(Self {
            dims,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.1; self.dims])
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Document source returning fixed documents
pub struct FakeLoader {
    pub documents: Vec<Document>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeLoader {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            documents: Vec::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentSource for FakeLoader {
    fn load(&self) -> Result<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SymbiontError::DocumentLoadError {
                path: "docs/broken.pdf".to_string(),
                reason: "not a PDF".to_string(),
            });
        }
        Ok(self.documents.clone())
    }
}

/// LLM that records every prompt it receives
#[derive(Default)]
pub struct FakeLlm {
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

impl FakeLlm {
    pub fn answering() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for FakeLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(SymbiontError::GenerationError("rate limited".to_string()));
        }
        Ok("The answer is in the test document.".to_string())
    }

    fn model_name(&self) -> &str {
        "fake-llm"
    }
}

pub fn hit(text: &str, score: f32) -> ScoredDocument {
    ScoredDocument {
        document: Document::new(text).with_metadata("source", "docs/test.pdf"),
        score,
    }
}

/// Write a one-page PDF containing `text`
pub fn write_pdf(path: &Path, text: &str) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
