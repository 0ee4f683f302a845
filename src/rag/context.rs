//! Retrieved-text context carried into prompts
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::document::ScoredDocument;

/// How long retrieved text stays in the context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContextScope {
    /// Accumulate text from every query of the session
    #[default]
    Session,
    /// Start from an empty context for each query
    Query,
}

/// Append-only text built from retrieved documents
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    text: String,
    scope: ContextScope,
    documents: usize,
}

impl SessionContext {
    pub fn new(scope: ContextScope) -> Self {
        Self {
            text: String::new(),
            scope,
            documents: 0,
        }
    }

    /// Called before each query; clears the text for per-query scope
    pub fn begin_query(&mut self) {
        if self.scope == ContextScope::Query {
            self.text.clear();
            self.documents = 0;
        }
    }

    /// Append one document with line breaks flattened, followed by a space
    pub fn absorb(&mut self, result: &ScoredDocument) {
        self.text.push_str(&result.document.flattened_content());
        self.text.push(' ');
        self.documents += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Documents absorbed since the context was last cleared
    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn scope(&self) -> ContextScope {
        self.scope
    }
}
