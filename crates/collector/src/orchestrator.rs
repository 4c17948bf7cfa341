//! Collection orchestrator
//!
//! Drives one query through resolve → citation URL → paginate → normalize →
//! assemble. Stage failures degrade: no paper or no citation URL yields an
//! empty result, no citations yields a minimal one. The caller always
//! receives a value, never an error.

use crate::client::ApiClient;
use crate::{normalizer, paginator, resolver};
use citegraph_common::errors::AppError;
use citegraph_common::models::{
    CitationRecord, CollectionMetadata, CollectionResult, PaperRecord,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Per-query collection session. Owns its client and caches exclusively;
/// nothing is shared across instances.
pub struct CitationCollector {
    client: ApiClient,
    base_url: String,
    per_page: u32,
    query: String,
    resolved_paper: Option<PaperRecord>,
    citation_url: Option<String>,
    raw_citations: Vec<Value>,
}

/// Throughput snapshot for one collection session
#[derive(Debug, Clone)]
pub struct PerformanceStats {
    pub requests_made: u64,
    pub collection_time: f64,
    pub avg_request_time: f64,
    pub query: String,
    pub main_paper_found: bool,
    pub citations_found: usize,
}

impl CitationCollector {
    pub fn new(
        client: ApiClient,
        base_url: impl Into<String>,
        per_page: u32,
        query: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            per_page,
            query: query.into(),
            resolved_paper: None,
            citation_url: None,
            raw_citations: Vec::new(),
        }
    }

    /// Collect up to `max_citations` citers for this session's query.
    pub async fn collect(
        &mut self,
        max_citations: usize,
        include_abstracts: bool,
    ) -> CollectionResult {
        // Resolve the main paper
        let paper = match resolver::resolve(
            &mut self.client,
            &self.base_url,
            &self.query,
            self.per_page,
        )
        .await
        {
            Ok(Some(paper)) => paper,
            Ok(None) => {
                let err = AppError::NoResultFound {
                    query: self.query.clone(),
                };
                error!(error = %err, "Could not find the main paper");
                return CollectionResult::empty();
            }
            Err(err) => {
                error!(query = %self.query, error = %err, "Search request failed");
                return CollectionResult::empty();
            }
        };
        self.resolved_paper = Some(paper.clone());

        // Resolve the citation URL
        let Some(citation_url) = paper.cited_by_api_url.clone() else {
            error!(query = %self.query, "Could not get citation URL");
            return CollectionResult::empty();
        };
        self.citation_url = Some(citation_url.clone());

        // Paginate the citers
        self.raw_citations =
            paginator::fetch_citations(&mut self.client, &citation_url, max_citations, self.per_page)
                .await;

        if self.raw_citations.is_empty() {
            warn!(
                query = %self.query,
                url = self.citation_url.as_deref().unwrap_or(""),
                "No citations found"
            );
            return CollectionResult {
                root_id: Some(paper.root_key()),
                citations: HashMap::new(),
                metadata: None,
            };
        }

        // Normalize and assemble
        let citations: HashMap<String, CitationRecord> =
            normalizer::normalize_batch(&self.raw_citations, include_abstracts);

        let metadata = CollectionMetadata {
            query: self.query.clone(),
            total_citations: citations.len(),
            collection_time: self.client.elapsed_secs(),
            requests_made: self.client.request_count(),
            main_paper: paper.summary(),
        };

        info!(
            citations = metadata.total_citations,
            elapsed_secs = metadata.collection_time,
            "Collection complete"
        );

        CollectionResult {
            root_id: Some(paper.root_key()),
            citations,
            metadata: Some(metadata),
        }
    }

    /// Throughput statistics for this session
    pub fn performance_stats(&self) -> PerformanceStats {
        let requests = self.client.request_count();
        let elapsed = self.client.elapsed_secs();
        PerformanceStats {
            requests_made: requests,
            collection_time: elapsed,
            avg_request_time: elapsed / requests.max(1) as f64,
            query: self.query.clone(),
            main_paper_found: self.resolved_paper.is_some(),
            citations_found: self.raw_citations.len(),
        }
    }
}
