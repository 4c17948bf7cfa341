//! Paper resolver
//!
//! Resolves a free-text query to a single canonical paper record: one search
//! request sorted by descending citation count, first (most-cited) result
//! taken as canonical. No disambiguation by design.

use crate::client::ApiClient;
use citegraph_common::errors::Result;
use citegraph_common::models::PaperRecord;
use tracing::{info, warn};

/// Resolve `query` to its most-cited work, or `None` when the search comes
/// back empty.
pub async fn resolve(
    client: &mut ApiClient,
    base_url: &str,
    query: &str,
    per_page: u32,
) -> Result<Option<PaperRecord>> {
    let params = [
        ("search", query.to_string()),
        ("page", "1".to_string()),
        ("per-page", per_page.to_string()),
        ("sort", "cited_by_count:desc".to_string()),
    ];

    info!(query, "Searching for paper");
    let data = client.request(base_url, &params).await?;

    let first = data
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|results| results.first());

    match first {
        Some(raw) => {
            let paper = PaperRecord::from_json(raw);
            info!(title = %paper.title, "Found paper");
            Ok(Some(paper))
        }
        None => {
            warn!(query, "No results found");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{test_client, ScriptedTransport};

    #[tokio::test]
    async fn test_takes_the_first_result() {
        let body = r#"{"results": [
            {"id": "https://openalex.org/W1", "title": "Most cited",
             "cited_by_count": 900, "publication_year": 2017,
             "cited_by_api_url": "https://api.test/works?filter=cites:W1"},
            {"id": "https://openalex.org/W9", "title": "Less cited", "cited_by_count": 3}
        ]}"#;
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(200, body)]);
        let mut client = test_client(Box::new(transport), 3);

        let paper = resolve(&mut client, "https://api.test/works", "most cited", 25)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paper.title, "Most cited");
        assert_eq!(paper.cited_by_count, 900);
        assert_eq!(
            paper.cited_by_api_url.as_deref(),
            Some("https://api.test/works?filter=cites:W1")
        );
    }

    #[tokio::test]
    async fn test_empty_results_resolve_to_none() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(200, r#"{"results": []}"#)]);
        let mut client = test_client(Box::new(transport), 3);

        let paper = resolve(&mut client, "https://api.test/works", "nothing", 25)
            .await
            .unwrap();
        assert!(paper.is_none());
    }

    #[tokio::test]
    async fn test_search_params_sort_by_citations() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(200, "{}")]);
        let handle = transport.clone();
        let mut client = test_client(Box::new(transport), 3);

        // "results" absent entirely also resolves to None
        let resolved = resolve(&mut client, "https://api.test/works", "a query", 25)
            .await
            .unwrap();
        assert!(resolved.is_none());

        let requests = handle.requests();
        assert_eq!(requests.len(), 1);
        let params = &requests[0].1;
        assert!(params.contains(&("search".to_string(), "a query".to_string())));
        assert!(params.contains(&("page".to_string(), "1".to_string())));
        assert!(params.contains(&("per-page".to_string(), "25".to_string())));
        assert!(params.contains(&("sort".to_string(), "cited_by_count:desc".to_string())));
    }
}
