//! Data model for citation collection
//!
//! Covers the resolved root paper, normalized citation records, and the
//! assembled collection result that gets persisted and later consumed by the
//! graph stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Reserved top-level key for the per-query collection metadata entry.
///
/// Work identifiers from the source are URL-form (or at least never start
/// with an underscore), so this sentinel cannot collide with them.
pub const METADATA_KEY: &str = "_metadata";

/// The resolved canonical paper for a query. Immutable once fetched.
#[derive(Debug, Clone)]
pub struct PaperRecord {
    /// Source identifier; absent in degenerate payloads
    pub id: Option<String>,
    pub title: String,
    pub cited_by_count: u64,
    pub publication_year: Option<i64>,
    /// Pagination URL listing this paper's citers
    pub cited_by_api_url: Option<String>,
}

impl PaperRecord {
    /// Extract a record from a raw work payload, tolerating missing or
    /// wrong-typed fields.
    pub fn from_json(raw: &Value) -> Self {
        Self {
            id: raw
                .get("id")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            title: raw
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            cited_by_count: raw
                .get("cited_by_count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            publication_year: raw.get("publication_year").and_then(Value::as_i64),
            cited_by_api_url: raw
                .get("cited_by_api_url")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
        }
    }

    /// Top-level key used for this paper in the collection result
    pub fn root_key(&self) -> String {
        self.id.clone().unwrap_or_else(|| "root".to_string())
    }

    /// Snapshot of the key fields for the metadata block
    pub fn summary(&self) -> RootPaperSummary {
        RootPaperSummary {
            title: self.title.clone(),
            id: self.id.clone().unwrap_or_default(),
            cited_by_count: self.cited_by_count,
            publication_year: self.publication_year,
        }
    }
}

/// A normalized citer record with a fixed schema.
///
/// Every list field is always a list, never null, even when the source data
/// is malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationRecord {
    pub title: String,
    pub openalex_id: Option<String>,
    pub cited_by_count: u64,
    pub publication_year: Option<i64>,
    /// Up to 10 related-work identifiers
    #[serde(default)]
    pub related_works: Vec<String>,
    /// Up to 10 reference identifiers
    #[serde(default)]
    pub references: Vec<String>,
    /// Author display names; empty string when unresolved
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub venue: String,
    pub doi: Option<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(rename = "type")]
    pub work_type: String,
    pub language: String,
    pub is_oa: bool,
    pub oa_url: Option<String>,
    /// Reconstructed from the inverted index when requested
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

/// Metadata block describing one collection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub query: String,
    pub total_citations: usize,
    /// Wall seconds since client construction
    pub collection_time: f64,
    pub requests_made: u64,
    pub main_paper: RootPaperSummary,
}

/// Root-paper snapshot carried inside the metadata block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootPaperSummary {
    pub title: String,
    pub id: String,
    pub cited_by_count: u64,
    pub publication_year: Option<i64>,
}

/// Outcome of one collection run.
///
/// Serializes to the flat document shape the store and graph stage consume:
/// `{}` when nothing was resolved, `{"<root>": {}}` when the paper resolved
/// but produced no citers, and the full mapping plus [`METADATA_KEY`]
/// otherwise. Downstream automation inspects this shape to detect failure.
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    pub root_id: Option<String>,
    pub citations: HashMap<String, CitationRecord>,
    pub metadata: Option<CollectionMetadata>,
}

impl CollectionResult {
    /// The empty result returned when orchestration fails outright
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no paper was resolved at all
    pub fn is_empty(&self) -> bool {
        self.root_id.is_none()
    }

    /// Serialize to the flat top-level document shape
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        if let Some(root_id) = &self.root_id {
            let citations: Map<String, Value> = self
                .citations
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
                .collect();
            doc.insert(root_id.clone(), Value::Object(citations));
            if let Some(metadata) = &self.metadata {
                doc.insert(
                    METADATA_KEY.to_string(),
                    serde_json::to_value(metadata).unwrap_or(Value::Null),
                );
            }
        }
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paper_record_tolerates_malformed_fields() {
        let raw = json!({
            "id": 42,
            "title": null,
            "cited_by_count": "many",
            "publication_year": 2017,
        });
        let paper = PaperRecord::from_json(&raw);
        assert_eq!(paper.id, None);
        assert_eq!(paper.title, "Unknown");
        assert_eq!(paper.cited_by_count, 0);
        assert_eq!(paper.publication_year, Some(2017));
        assert_eq!(paper.root_key(), "root");
    }

    #[test]
    fn test_empty_result_serializes_to_empty_object() {
        let result = CollectionResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.to_json(), json!({}));
    }

    #[test]
    fn test_minimal_result_has_no_metadata_entry() {
        let result = CollectionResult {
            root_id: Some("https://openalex.org/W1".to_string()),
            citations: HashMap::new(),
            metadata: None,
        };
        assert_eq!(result.to_json(), json!({"https://openalex.org/W1": {}}));
    }

    #[test]
    fn test_metadata_key_is_reserved() {
        assert!(METADATA_KEY.starts_with('_'));
    }
}
