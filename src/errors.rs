//! Error types for Symbiont
//!
//! One error enum covers both phases of a run. Startup errors
//! (configuration, loading, store bootstrap) end the process; query-time
//! errors are caught by the query loop and reported per query.

use thiserror::Error;

/// Main error type for Symbiont
#[derive(Error, Debug)]
pub enum SymbiontError {
    /// Invalid or missing startup configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Document ingestion failed
    #[error("Failed to load document {path}: {reason}")]
    DocumentLoadError { path: String, reason: String },

    /// Vector store connectivity or collection operation failure
    #[error("Vector store error: {0}")]
    StoreError(String),

    /// Similarity search failure at query time
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// LLM call failure
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// Embedding backend failure
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError { provider: String, message: String },

    /// Query loop state machine misuse
    #[error("Invalid state transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    /// Terminal input errors
    #[error("Input error: {0}")]
    ReadlineError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Symbiont operations
pub type Result<T> = std::result::Result<T, SymbiontError>;

impl SymbiontError {
    /// Shorthand for embedding failures
    pub fn embedding(provider: &str, message: impl Into<String>) -> Self {
        SymbiontError::EmbeddingError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Errors raised by the startup phase that must terminate the process
    pub fn is_fatal_at_startup(&self) -> bool {
        !matches!(
            self,
            SymbiontError::RetrievalError(_) | SymbiontError::GenerationError(_)
        )
    }

    /// Re-classify an error raised while serving a query as a retrieval failure.
    ///
    /// Generation failures keep their own kind so the caller can still
    /// show the retrieved documents.
    pub fn into_retrieval(self) -> Self {
        match self {
            e @ SymbiontError::RetrievalError(_) => e,
            e @ SymbiontError::GenerationError(_) => e,
            other => SymbiontError::RetrievalError(other.to_string()),
        }
    }
}

impl From<rustyline::error::ReadlineError> for SymbiontError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        SymbiontError::ReadlineError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SymbiontError::DocumentLoadError {
            path: "docs/a.pdf".to_string(),
            reason: "invalid xref".to_string(),
        };
        assert!(err.to_string().contains("docs/a.pdf"));
        assert!(err.to_string().contains("invalid xref"));
    }

    #[test]
    fn test_startup_classification() {
        assert!(SymbiontError::ConfigurationError("x".into()).is_fatal_at_startup());
        assert!(SymbiontError::StoreError("x".into()).is_fatal_at_startup());
        assert!(!SymbiontError::RetrievalError("x".into()).is_fatal_at_startup());
        assert!(!SymbiontError::GenerationError("x".into()).is_fatal_at_startup());
    }

    #[test]
    fn test_into_retrieval() {
        let err = SymbiontError::StoreError("collection not found".into()).into_retrieval();
        assert!(matches!(err, SymbiontError::RetrievalError(ref m) if m.contains("collection not found")));

        let err = SymbiontError::GenerationError("rate limited".into()).into_retrieval();
        assert!(matches!(err, SymbiontError::GenerationError(_)));
    }
}
