//! Symbiont - Main CLI Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use symbiont::{
    cli::{Args, Config},
    config::Settings,
    embedding::{EmbeddingBackend, EmbeddingProvider},
    llm::{LanguageModel, OpenAiChat},
    loader::PdfDirectoryLoader,
    rag::{BootstrapReport, RagPipeline},
    repl::{DisplayManager, QueryLoop, ReadlineInput},
    store::{QdrantStore, VectorStore},
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let verbosity = args.verbosity();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut session = match start(args).await {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to start Symbiont: {:#}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = session.run().await {
        error!("Query loop stopped: {:#}", err);
        std::process::exit(1);
    }
}

/// Everything the query loop needs once startup has succeeded
struct Session {
    pipeline: RagPipeline,
    display: DisplayManager,
    input: ReadlineInput,
}

impl Session {
    /// Run the loop until exit or Ctrl-C; history is saved either way
    async fn run(&mut self) -> Result<()> {
        let display = std::mem::take(&mut self.display);
        let mut query_loop = QueryLoop::new(&mut self.pipeline, display);

        let outcome = tokio::select! {
            summary = query_loop.run(&mut self.input) => Some(summary),
            _ = tokio::signal::ctrl_c() => None,
        };

        let summary = match outcome {
            Some(summary) => summary,
            None => {
                query_loop.interrupt();
                Ok(query_loop.interrupted_summary())
            }
        };

        if let Err(e) = self.input.save_history() {
            warn!(error = %e, "failed to save history");
        }

        let summary = summary?;
        info!(queries = summary.queries, failures = summary.failures, "goodbye");
        Ok(())
    }
}

async fn start(args: Args) -> Result<Session> {
    let verbosity = args.verbosity();

    // 1. Resolve configuration before touching the network
    let file = Config::load(args.config.as_deref())?;
    let settings = Settings::from_env(&args, &file)?;
    info!(
        collection = %settings.collection_name,
        k = settings.k,
        embeddings = ?settings.embedding_kind,
        "starting Symbiont"
    );

    // 2. Backends
    let store: Arc<dyn VectorStore> = Arc::new(QdrantStore::connect(
        &settings.qdrant_url,
        settings.qdrant_api_key.as_deref(),
    )?);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(EmbeddingBackend::connect(&settings).await?);
    let llm: Option<Arc<dyn LanguageModel>> = if settings.llm_response {
        Some(Arc::new(OpenAiChat::new(
            &settings.openai_base_url,
            &settings.api_key,
            &settings.llm_name,
            settings.temperature,
        )?))
    } else {
        None
    };

    let pipeline = RagPipeline::from_settings(&settings, store, embedder, llm);

    // 3. Ingest once
    let loader = PdfDirectoryLoader::new(&settings.docs_directory).with_progress(verbosity.show_progress());
    match pipeline
        .bootstrap(&loader)
        .await
        .with_context(|| format!("bootstrapping collection '{}'", settings.collection_name))?
    {
        BootstrapReport::Existing => {}
        BootstrapReport::Created { documents } => {
            info!(documents, "collection created");
        }
    }

    // 4. Interactive loop
    let display = DisplayManager::new().with_progress(verbosity.show_progress());
    if !matches!(verbosity, symbiont::cli::Verbosity::Quiet) {
        let model = settings.llm_response.then_some(settings.llm_name.as_str());
        display.show_banner(
            &format!("v{}", env!("CARGO_PKG_VERSION")),
            &settings.collection_name,
            settings.k,
            model,
        );
    }

    let input = ReadlineInput::with_history(settings.history_file.clone())?;

    Ok(Session {
        pipeline,
        display,
        input,
    })
}
