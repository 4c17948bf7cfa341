//! Record normalizer
//!
//! Converts raw citer payloads into [`CitationRecord`]s with a fixed schema.
//! Every nested field access tolerates null, wrong types, and absence; a
//! record that cannot be normalized is logged and skipped, never fatal for
//! the batch.

use citegraph_common::errors::{AppError, Result};
use citegraph_common::models::CitationRecord;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

/// Bounded fan-out for related-work and reference lists
const MAX_LINKED_WORKS: usize = 10;

/// Normalize one raw citer record
pub fn normalize_record(raw: &Value, include_abstract: bool) -> Result<CitationRecord> {
    let obj = raw.as_object().ok_or_else(|| AppError::MalformedRecord {
        message: "non-object citation entry".to_string(),
    })?;

    let authors = obj
        .get("authorships")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(author_name).collect())
        .unwrap_or_default();

    let concepts = obj
        .get("concepts")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|c| {
                    c.get("display_name")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default();

    let open_access = obj.get("open_access");

    let abstract_text = if include_abstract {
        obj.get("abstract_inverted_index")
            .and_then(Value::as_object)
            .filter(|index| !index.is_empty())
            .map(reconstruct_abstract)
    } else {
        None
    };

    Ok(CitationRecord {
        title: obj
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Title")
            .to_string(),
        openalex_id: obj
            .get("id")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        cited_by_count: obj
            .get("cited_by_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        publication_year: obj.get("publication_year").and_then(Value::as_i64),
        related_works: string_list(obj.get("related_works"), MAX_LINKED_WORKS),
        references: string_list(obj.get("referenced_works"), MAX_LINKED_WORKS),
        authors,
        venue: obj
            .get("primary_location")
            .and_then(|location| location.get("source"))
            .and_then(|source| source.get("display_name"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        doi: obj
            .get("doi")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        concepts,
        work_type: obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("journal-article")
            .to_string(),
        language: obj
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or("en")
            .to_string(),
        is_oa: open_access
            .and_then(|oa| oa.get("is_oa"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        oa_url: open_access
            .and_then(|oa| oa.get("oa_url"))
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        abstract_text,
    })
}

/// Normalize a batch, keyed by each record's identifier. Records without one
/// get a synthesized `unknown_<n>` key (n = accepted records so far), so
/// keys never collide within a run.
pub fn normalize_batch(raw_records: &[Value], include_abstract: bool) -> HashMap<String, CitationRecord> {
    let mut citations = HashMap::new();

    for raw in raw_records {
        let record = match normalize_record(raw, include_abstract) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "Skipping malformed citation entry");
                continue;
            }
        };
        let key = record
            .openalex_id
            .clone()
            .unwrap_or_else(|| format!("unknown_{}", citations.len()));
        citations.insert(key, record);
    }

    citations
}

/// Author display name, first non-empty wins: nested author profile, then
/// raw author name, then the first institution. Empty string if unresolved.
fn author_name(entry: &Value) -> String {
    if !entry.is_object() {
        return String::new();
    }

    entry
        .get("author")
        .and_then(|author| author.get("display_name"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            entry
                .get("raw_author_name")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .or_else(|| {
            entry
                .get("institutions")
                .and_then(Value::as_array)
                .and_then(|institutions| institutions.first())
                .and_then(|institution| institution.get("display_name"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("")
        .to_string()
}

/// Typed extraction of a string list; non-list fields become empty, non-string
/// elements are dropped, and the result is truncated to `limit`.
fn string_list(value: Option<&Value>, limit: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .take(limit)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Rebuild an abstract from its inverted index: flatten to (position, word)
/// pairs, stable-sort by position, join with spaces. Position ties keep the
/// index's iteration order.
pub fn reconstruct_abstract(index: &Map<String, Value>) -> String {
    let mut words: Vec<(i64, &str)> = Vec::new();

    for (word, positions) in index {
        if let Some(list) = positions.as_array() {
            for position in list {
                if let Some(p) = position.as_i64() {
                    words.push((p, word.as_str()));
                }
            }
        }
    }

    words.sort_by_key(|(position, _)| *position);
    words
        .iter()
        .map(|(_, word)| *word)
        .collect::<Vec<_>>()
        .join(" ")
}
