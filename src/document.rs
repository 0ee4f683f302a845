//! Document records produced by the loader and returned by search

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Text plus metadata (source path, page number, ...).
///
/// Metadata uses a `BTreeMap` so it is displayed in a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, JsonValue>,
}

/// A document returned by similarity search with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    /// Cosine similarity, higher is closer
    pub score: f32,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Page content with line breaks replaced by spaces
    pub fn flattened_content(&self) -> String {
        flatten_lines(&self.page_content)
    }
}

/// Replace every line break with a single space
pub fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_metadata() {
        let doc = Document::new("body")
            .with_metadata("source", "a.pdf")
            .with_metadata("page", 2);
        assert_eq!(doc.metadata["source"], JsonValue::String("a.pdf".into()));
        assert_eq!(doc.metadata["page"], JsonValue::from(2));
    }

    #[test]
    fn test_flatten_lines() {
        assert_eq!(flatten_lines("a\nb\r\nc\rd"), "a b c d");
        assert_eq!(flatten_lines("no breaks"), "no breaks");
    }

    #[test]
    fn test_metadata_order_is_stable() {
        let doc = Document::new("x")
            .with_metadata("z", 1)
            .with_metadata("a", 2);
        let keys: Vec<_> = doc.metadata.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }
}
