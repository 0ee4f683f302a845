//! Resolved runtime settings
//!
//! Merges command-line flags, environment variables (a `.env` file is
//! loaded first) and the optional configuration file into one immutable
//! [`Settings`] value. Precedence: flag > environment > file > default.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::cli::{Args, Config};
use crate::embedding::EmbeddingKind;
use crate::errors::{Result, SymbiontError};
use crate::rag::context::ContextScope;
use crate::rag::prompt::DEFAULT_BASE_PROMPT;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_LLM_NAME: &str = "LLM_NAME";
pub const ENV_BASE_PROMPT: &str = "QA_BASE_PROMPT";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_QDRANT_API_KEY: &str = "QDRANT_API_KEY";

/// Immutable configuration for one run
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub docs_directory: PathBuf,
    pub collection_name: String,
    pub k: usize,
    pub llm_response: bool,
    /// Reserved for exporting results; nothing is written there yet
    pub output_directory: PathBuf,
    pub api_key: String,
    pub llm_name: String,
    pub base_prompt: String,
    pub temperature: f32,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub embedding_kind: EmbeddingKind,
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub context_scope: ContextScope,
    pub history_file: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment
    pub fn from_env(args: &Args, file: &Config) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::resolve(args, file, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    ///
    /// Validation happens before anything touches the network: the
    /// documents directory is checked first, then the API credential.
    pub fn resolve<F>(args: &Args, file: &Config, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !args.docs_directory.is_dir() {
            return Err(SymbiontError::ConfigurationError(format!(
                "Directory {} does not exist",
                args.docs_directory.display()
            )));
        }

        let collection_name = args.collection_name.trim().to_string();
        if collection_name.is_empty() {
            return Err(SymbiontError::ConfigurationError(
                "Collection name must not be empty".to_string(),
            ));
        }

        let api_key = env(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SymbiontError::ConfigurationError(format!(
                    "Please set the {} environment variable",
                    ENV_API_KEY
                ))
            })?;

        let embedding_credential = if args.local_embeddings {
            None
        } else {
            Some(api_key.as_str())
        };
        let embedding_kind = EmbeddingKind::select(embedding_credential);

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let llm_name = non_empty(env(ENV_LLM_NAME)).unwrap_or_else(|| file.openai.chat_model.clone());
        let base_prompt = non_empty(env(ENV_BASE_PROMPT))
            .or_else(|| file.prompt.base.clone())
            .unwrap_or_else(|| DEFAULT_BASE_PROMPT.to_string());
        let openai_base_url = non_empty(env(ENV_OPENAI_BASE_URL))
            .unwrap_or_else(|| file.openai.base_url.clone())
            .trim_end_matches('/')
            .to_string();
        let qdrant_url = non_empty(args.qdrant_url.clone()).unwrap_or_else(|| file.qdrant.url.clone());
        let qdrant_api_key = non_empty(env(ENV_QDRANT_API_KEY)).or_else(|| file.qdrant.api_key.clone());

        let settings = Settings {
            docs_directory: args.docs_directory.clone(),
            collection_name,
            k: args.k_value as usize,
            llm_response: args.llm_enabled(),
            output_directory: args.output_directory.clone(),
            api_key,
            llm_name,
            base_prompt,
            temperature: file.openai.temperature,
            openai_base_url,
            embedding_model: file.openai.embedding_model.clone(),
            embedding_kind,
            qdrant_url,
            qdrant_api_key,
            context_scope: args.context_scope.unwrap_or(file.retrieval.context_scope),
            history_file: file.history_file(),
        };

        debug!(settings = ?settings, "resolved settings");
        Ok(settings)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("docs_directory", &self.docs_directory)
            .field("collection_name", &self.collection_name)
            .field("k", &self.k)
            .field("llm_response", &self.llm_response)
            .field("output_directory", &self.output_directory)
            .field("api_key", &"<redacted>")
            .field("llm_name", &self.llm_name)
            .field("temperature", &self.temperature)
            .field("openai_base_url", &self.openai_base_url)
            .field("embedding_kind", &self.embedding_kind)
            .field("qdrant_url", &self.qdrant_url)
            .field("context_scope", &self.context_scope)
            .finish_non_exhaustive()
    }
}
