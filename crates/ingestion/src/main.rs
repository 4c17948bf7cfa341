//! Citegraph Ingestion Service
//!
//! Loads a directory of PDF papers into page-level text documents:
//! 1. Extracts per-page text from each PDF
//! 2. Resolves a display title per file (metadata, else filename)
//! 3. Reports what was loaded
//!
//! Deliberately not wired into the citation pipeline.

mod errors;
mod loader;
mod pdf;

use citegraph_common::config::{AppConfig, ObservabilityConfig};
use citegraph_common::VERSION;
use loader::DocumentLoader;
use std::path::Path;
use tracing::{debug, info};

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().unwrap_or_default();

    init_tracing(&config.observability);

    info!("Starting citegraph ingestion v{}", VERSION);

    let dir = std::env::args().nth(1).unwrap_or_else(|| "./papers".to_string());
    let dir = Path::new(&dir);

    let mut loader = DocumentLoader::new();
    let documents = loader.load_directory(dir)?;

    let total_chars: usize = documents.iter().map(|doc| doc.content.len()).sum();
    info!(
        pages = documents.len(),
        files = loader.extracted_titles().len(),
        chars = total_chars,
        "Directory processing complete"
    );

    for (file, title) in loader.extracted_titles() {
        info!(file = %file, title = %title, "Extracted title");
    }

    for doc in documents.iter().filter(|doc| doc.metadata.page == 1) {
        debug!(
            source = %doc.metadata.source.display(),
            title = %doc.metadata.title,
            "Loaded document"
        );
    }

    // TODO: index the page documents into the retrieval store once the QA
    // chain lands

    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
