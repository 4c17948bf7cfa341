//! Citation paginator
//!
//! Walks the citation-listing endpoint page by page until the target count
//! is reached or the data runs out. A failing page logs and stops the walk
//! early; the partial accumulation is returned rather than raised.

use crate::client::ApiClient;
use serde_json::Value;
use tracing::{error, info};

/// Accumulate raw citer records from `citation_url`, at most `max_citations`.
pub async fn fetch_citations(
    client: &mut ApiClient,
    citation_url: &str,
    max_citations: usize,
    per_page: u32,
) -> Vec<Value> {
    let mut all_citations: Vec<Value> = Vec::new();
    let mut page: u32 = 1;

    info!(url = citation_url, "Fetching citations");

    while all_citations.len() < max_citations {
        let params = [
            ("page", page.to_string()),
            ("per-page", per_page.to_string()),
            ("sort", "cited_by_count:desc".to_string()),
        ];

        let data = match client.request(citation_url, &params).await {
            Ok(data) => data,
            Err(err) => {
                error!(page, error = %err, "Error fetching citations page, stopping early");
                break;
            }
        };

        let results = data
            .get("results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        if results.is_empty() {
            info!(page, "No more citations found");
            break;
        }

        let fetched = results.len();
        all_citations.extend(results);

        info!(
            fetched,
            page,
            total = all_citations.len(),
            "Fetched citations page"
        );

        // A short page signals the end of the data
        if fetched < per_page as usize {
            break;
        }

        page += 1;
    }

    all_citations.truncate(max_citations);
    info!(total = all_citations.len(), "Total citations collected");
    all_citations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{test_client, ScriptedTransport};
    use citegraph_common::errors::AppError;
    use serde_json::json;

    fn page_body(count: usize, offset: usize) -> String {
        let results: Vec<Value> = (0..count)
            .map(|i| json!({"id": format!("W{}", offset + i)}))
            .collect();
        json!({ "results": results }).to_string()
    }

    #[tokio::test]
    async fn test_stops_on_short_page() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(200, &page_body(25, 0)),
            ScriptedTransport::ok(200, &page_body(25, 25)),
            ScriptedTransport::ok(200, &page_body(10, 50)),
        ]);
        let handle = transport.clone();
        let mut client = test_client(Box::new(transport), 3);

        let citations = fetch_citations(&mut client, "https://api.test/cited-by", 100, 25).await;
        assert_eq!(citations.len(), 60);
        assert_eq!(handle.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_truncates_to_target_count() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(200, &page_body(25, 0)),
            ScriptedTransport::ok(200, &page_body(25, 25)),
        ]);
        let handle = transport.clone();
        let mut client = test_client(Box::new(transport), 3);

        let citations = fetch_citations(&mut client, "https://api.test/cited-by", 30, 25).await;
        assert_eq!(citations.len(), 30);
        // Target reached after two pages; no third request issued
        assert_eq!(handle.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_page_error_degrades_to_partial_results() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(200, &page_body(25, 0)),
            Err(AppError::Transport {
                message: "connection reset".to_string(),
            }),
            Err(AppError::Transport {
                message: "connection reset".to_string(),
            }),
            Err(AppError::Transport {
                message: "connection reset".to_string(),
            }),
        ]);
        let mut client = test_client(Box::new(transport), 3);

        let citations = fetch_citations(&mut client, "https://api.test/cited-by", 100, 25).await;
        assert_eq!(citations.len(), 25);
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_nothing() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            200,
            r#"{"results": []}"#,
        )]);
        let mut client = test_client(Box::new(transport), 3);

        let citations = fetch_citations(&mut client, "https://api.test/cited-by", 100, 25).await;
        assert!(citations.is_empty());
    }
}
