//! Citegraph Collector Service
//!
//! Collects citation metadata from the bibliographic API:
//! 1. Resolves each configured query to its most-cited paper
//! 2. Pages through that paper's citers
//! 3. Normalizes the raw records into the fixed schema
//! 4. Merges all results into one persisted JSON document

mod client;
mod normalizer;
mod orchestrator;
mod paginator;
mod resolver;

use anyhow::Context;
use citegraph_common::config::{AppConfig, ObservabilityConfig};
use citegraph_common::{store, VERSION};
use client::{ApiClient, HttpTransport, RetryPolicy};
use orchestrator::CitationCollector;
use serde_json::Map;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.observability);

    info!("Starting citegraph collector v{}", VERSION);

    if config.collection.queries.is_empty() {
        warn!("No queries configured; set collection.queries and re-run");
        return Ok(());
    }

    let mut doc = Map::new();

    for query in &config.collection.queries {
        info!(query = %query, "Collecting citation data");

        let transport = HttpTransport::new(config.request_timeout());
        let policy = RetryPolicy {
            max_retries: config.client.max_retries,
            delay: config.rate_delay(),
        };
        let client = ApiClient::new(Box::new(transport), policy);

        let mut collector = CitationCollector::new(
            client,
            &config.api.base_url,
            config.collection.per_page,
            query,
        );

        let result = collector
            .collect(
                config.collection.max_citations,
                config.collection.include_abstracts,
            )
            .await;

        let stats = collector.performance_stats();
        info!(
            query = %stats.query,
            requests = stats.requests_made,
            elapsed_secs = stats.collection_time,
            avg_request_secs = stats.avg_request_time,
            citations = stats.citations_found,
            paper_found = stats.main_paper_found,
            "Performance stats"
        );

        if result.is_empty() {
            warn!(query = %query, "No citations collected");
            continue;
        }

        store::merge_result(&mut doc, &result);
    }

    if doc.is_empty() {
        error!("No data collected");
        return Ok(());
    }

    let path = std::path::Path::new(&config.output.path);
    store::save(path, &doc).context("Failed to save collection document")?;

    info!(
        root_papers = store::root_keys(&doc).count(),
        total_citations = store::total_citations(&doc),
        "Collection run finished"
    );

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
