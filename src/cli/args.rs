//! Command-line argument parsing for Symbiont
//!
//! Flag names keep their snake_case spelling (`--docs_directory`,
//! `--k_value`, ...) so existing invocations keep working.

use clap::Parser;
use std::path::PathBuf;

use crate::rag::context::ContextScope;

/// Symbiont - ask questions about a folder of PDFs
#[derive(Parser, Debug, Clone)]
#[command(name = "symbiont")]
#[command(version)]
#[command(about = "Process documents, store embeddings and answer queries against them", long_about = None)]
pub struct Args {
    /// Directory to load documents from
    #[arg(long = "docs_directory", value_name = "DIR")]
    pub docs_directory: PathBuf,

    /// Name of the Qdrant collection
    #[arg(long = "collection_name", value_name = "NAME")]
    pub collection_name: String,

    /// Number of documents to retrieve
    #[arg(long = "k_value", default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub k_value: u64,

    /// Use the LLM for responses ("yes") or plain similarity search ("no")
    #[arg(long = "llm_response", default_value = "yes")]
    pub llm_response: String,

    /// Directory reserved for saving search results
    #[arg(long = "output_directory", default_value = "search_results")]
    pub output_directory: PathBuf,

    /// Qdrant gRPC endpoint
    #[arg(long = "qdrant_url", env = "QDRANT_URL")]
    pub qdrant_url: Option<String>,

    /// Embed with the local MiniLM model even when an API key is set
    #[arg(long = "local_embeddings")]
    pub local_embeddings: bool,

    /// Whether retrieved context accumulates over the session or resets per query
    #[arg(long = "context_scope", value_enum)]
    pub context_scope: Option<ContextScope>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only warnings and errors are logged)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Whether the LLM should be asked after retrieval
    pub fn llm_enabled(&self) -> bool {
        !self.llm_response.trim().eq_ignore_ascii_case("no")
    }
}

impl Verbosity {
    /// Default `tracing` filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "symbiont=debug,info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
