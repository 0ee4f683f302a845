//! Document loading
//!
//! Turns files on disk into [`Document`] records for embedding.

pub mod pdf;

use crate::document::Document;
use crate::errors::Result;

pub use pdf::PdfDirectoryLoader;

/// Produces the full set of documents to ingest
pub trait DocumentSource: Send + Sync {
    fn load(&self) -> Result<Vec<Document>>;
}
