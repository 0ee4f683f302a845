//! Symbiont - Document Q&A over a Qdrant collection
//!
//! Ingests a directory of PDFs into a vector collection once, then answers
//! questions interactively by retrieving the most similar pages and,
//! optionally, asking an LLM to answer from them.
//!
//! # Architecture
//!
//! - **Ingestion**: PDF loader + embedding backend + vector store
//! - **Query**: similarity search, session context, prompt rendering
//! - **Interface**: clap CLI, rustyline loop, coloured terminal output

pub mod errors;
pub mod document;

// Configuration layers
pub mod cli;
pub mod config;

// Ingestion and retrieval backends
pub mod loader;
pub mod embedding;
pub mod store;
pub mod llm;

// Orchestration
pub mod rag;
pub mod repl;

// Re-export commonly used types
pub use config::Settings;
pub use document::{Document, ScoredDocument};
pub use errors::{Result, SymbiontError};
pub use rag::{BootstrapReport, RagPipeline};
pub use repl::{LoopSummary, QueryLoop};
