//! Citegraph Graph Service
//!
//! Consumes the persisted collection document:
//! 1. Loads the merged JSON store written by the collector
//! 2. Selects the first root entry and rebuilds its citation records
//! 3. Builds the directed citation graph (citers -> root)
//! 4. Writes the DOT and JSON render artifacts

mod builder;
mod render;

use anyhow::Context;
use builder::build_citation_graph;
use citegraph_common::config::{AppConfig, ObservabilityConfig};
use citegraph_common::{store, VERSION};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.observability);

    info!("Starting citegraph graph builder v{}", VERSION);

    let store_path = Path::new(&config.output.path);
    let doc = store::load(store_path)
        .with_context(|| format!("Failed to load collection document {}", store_path.display()))?;

    let Some(root_key) = store::root_keys(&doc).next().cloned() else {
        warn!(path = %store_path.display(), "Collection document has no root entries");
        return Ok(());
    };

    let citations = store::citations_for(&doc, &root_key);
    let root_title = store::root_title(&doc);

    let (graph, edges) = build_citation_graph(&root_key, &citations, root_title.as_deref());

    let root_bare = builder::extract_id(&root_key);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        root = %root_bare,
        citers = graph.citation_count(root_bare),
        "Citation graph built"
    );

    if let Some(root_node) = graph.node(root_bare) {
        info!(label = %root_node.label, "Root node");
    }

    for (id, node) in graph.nodes() {
        info!(id = %id, label = %node.label, node_type = node.node_type.as_str(), "Node");
    }

    if edges.is_empty() {
        info!("No edges found in the graph");
    }
    for (citing, cited) in &edges {
        info!(citing = %citing, cited = %cited, "Edge");
    }

    let out_dir = store_path.parent().unwrap_or_else(|| Path::new("."));
    let dot_path = out_dir.join("citation_graph.dot");
    let json_path = out_dir.join("citation_graph.json");

    fs::write(&dot_path, render::to_dot(&graph))
        .with_context(|| format!("Failed to write {}", dot_path.display()))?;
    fs::write(
        &json_path,
        serde_json::to_string_pretty(&render::to_json(&graph, &edges))?,
    )
    .with_context(|| format!("Failed to write {}", json_path.display()))?;

    info!(
        dot = %dot_path.display(),
        json = %json_path.display(),
        "Render artifacts written"
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
