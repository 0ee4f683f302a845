//! Language model access
pub mod openai;

use async_trait::async_trait;

use crate::errors::Result;

pub use openai::OpenAiChat;

/// Generates a completion for a fully rendered prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier shown to the user
    fn model_name(&self) -> &str;
}
