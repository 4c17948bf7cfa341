//! Persisted collection store
//!
//! One flat JSON document holds the merged output of one or more collection
//! runs: top-level keys are root-paper identifiers (plus the reserved
//! [`METADATA_KEY`] entry), merged by key. Later runs overwrite earlier ones
//! on key collision, metadata included — a documented limitation. The graph
//! stage re-loads this document as plain data; no live objects cross the
//! stage boundary.

use crate::errors::Result;
use crate::models::{CitationRecord, CollectionResult, METADATA_KEY};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Merge one collection outcome into the document, overwriting on collision
pub fn merge_result(doc: &mut Map<String, Value>, result: &CollectionResult) {
    if let Value::Object(entries) = result.to_json() {
        for (key, value) in entries {
            doc.insert(key, value);
        }
    }
}

/// Write the document as pretty-printed JSON, creating parent directories
pub fn save(path: &Path, doc: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(&Value::Object(doc.clone()))?;
    fs::write(path, body)?;
    info!(path = %path.display(), entries = doc.len(), "Collection document saved");
    Ok(())
}

/// Load a previously saved document
pub fn load(path: &Path) -> Result<Map<String, Value>> {
    let body = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&body)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Top-level root-paper keys, metadata entry excluded
pub fn root_keys(doc: &Map<String, Value>) -> impl Iterator<Item = &String> {
    doc.keys().filter(|k| k.as_str() != METADATA_KEY)
}

/// Deserialize the citation mapping stored under one root key.
///
/// Entries that no longer match the record schema are dropped rather than
/// failing the whole load.
pub fn citations_for(doc: &Map<String, Value>, root_id: &str) -> HashMap<String, CitationRecord> {
    doc.get(root_id)
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| {
                    serde_json::from_value::<CitationRecord>(v.clone())
                        .ok()
                        .map(|record| (k.clone(), record))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Root-paper title recorded in the metadata entry, if any
pub fn root_title(doc: &Map<String, Value>) -> Option<String> {
    doc.get(METADATA_KEY)?
        .get("main_paper")?
        .get("title")?
        .as_str()
        .map(|s| s.to_string())
}

/// Total citation records across all root entries
pub fn total_citations(doc: &Map<String, Value>) -> usize {
    root_keys(doc)
        .filter_map(|k| doc.get(k))
        .filter_map(Value::as_object)
        .map(|entries| entries.len())
        .sum()
}
