// Retrieval-augmented generation over the ingested collection
//
// Components:
// - Context: session-scoped accumulation of retrieved text
// - Prompt: question-answering template
// - Pipeline: bootstrap, search and generation orchestration

pub mod context;
pub mod pipeline;
pub mod prompt;

pub use context::{ContextScope, SessionContext};
pub use pipeline::{BootstrapReport, RagPipeline};
pub use prompt::{PromptTemplate, DEFAULT_BASE_PROMPT};
