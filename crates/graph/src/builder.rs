//! Citation graph construction
//!
//! Builds a directed in-memory graph from a normalized citation mapping:
//! one root node, one node per distinct citing identifier, and one edge per
//! citer pointing at the root. Self-referential entries are dropped.

use citegraph_common::models::CitationRecord;
use std::collections::{HashMap, HashSet};

/// Node role in the citation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The single resolved paper whose citers were collected
    Root,
    /// A work citing the root
    Cited,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Cited => "cited",
        }
    }
}

/// Node attributes for display
#[derive(Debug, Clone)]
pub struct Node {
    pub label: String,
    pub node_type: NodeType,
}

/// In-memory directed citation graph.
///
/// Node and edge enumeration follows hash-map iteration order, which is not
/// guaranteed stable across runs; consumers must rely on membership only.
pub struct CitationGraph {
    /// Node attributes by extracted identifier
    nodes: HashMap<String, Node>,

    /// Adjacency list: node -> nodes it points at
    outgoing: HashMap<String, Vec<String>>,

    /// Reverse adjacency: node -> nodes pointing at it
    incoming: HashMap<String, Vec<String>>,
}

impl CitationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }

    /// Add a node, overwriting attributes on re-insertion
    pub fn add_node(&mut self, id: &str, label: String, node_type: NodeType) {
        self.nodes.insert(id.to_string(), Node { label, node_type });
    }

    /// Add a directed edge. Endpoints missing from the node set are
    /// registered with a synthetic label.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        for id in [from, to] {
            if !self.nodes.contains_key(id) {
                self.add_node(id, format!("Paper {id}"), NodeType::Cited);
            }
        }

        self.outgoing
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.incoming
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
    }

    /// Node attributes by identifier
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes with attributes
    pub fn nodes(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(|v| v.len()).sum()
    }

    /// Nodes pointing at this node (for the root: its citers)
    pub fn citers_of(&self, id: &str) -> &[String] {
        self.incoming.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Incoming edge count
    pub fn citation_count(&self, id: &str) -> usize {
        self.incoming.get(id).map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for CitationGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the bare identifier from a URL-form identifier
/// (e.g. `W3159481202` from `https://openalex.org/W3159481202`).
pub fn extract_id(raw: &str) -> &str {
    raw.rsplit('/').next().unwrap_or(raw)
}

/// Build the directed citation graph and its edge list.
///
/// Citing identifiers are set-deduplicated before node and edge creation,
/// so repeated raw identifiers collapse to one node. An identifier equal to
/// the root's produces neither a node overwrite nor a self-loop.
pub fn build_citation_graph(
    root_id: &str,
    citations: &HashMap<String, CitationRecord>,
    root_title: Option<&str>,
) -> (CitationGraph, Vec<(String, String)>) {
    let mut graph = CitationGraph::new();
    let root = extract_id(root_id).to_string();

    let root_label = root_title
        .map(|t| t.to_string())
        .unwrap_or_else(|| format!("Paper {root}"));
    graph.add_node(&root, root_label, NodeType::Root);

    // Distinct citing identifiers
    let cited_papers: HashSet<&String> = citations.keys().collect();

    for pid in &cited_papers {
        let extracted = extract_id(pid);
        if extracted == root {
            continue;
        }
        let label = citations
            .get(*pid)
            .map(|record| record.title.clone())
            .unwrap_or_else(|| format!("Paper {extracted}"));
        graph.add_node(extracted, label, NodeType::Cited);
    }

    // Edges from each citer to the root; extracted duplicates collapse
    let mut edges = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for pid in &cited_papers {
        let extracted = extract_id(pid).to_string();
        if extracted == root || !seen.insert(extracted.clone()) {
            continue;
        }
        graph.add_edge(&extracted, &root);
        edges.push((extracted, root.clone()));
    }

    (graph, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(title: &str) -> CitationRecord {
        serde_json::from_value(json!({
            "title": title,
            "openalex_id": null,
            "cited_by_count": 0,
            "publication_year": null,
            "related_works": [],
            "references": [],
            "authors": [],
            "venue": "",
            "doi": null,
            "concepts": [],
            "type": "journal-article",
            "language": "en",
            "is_oa": false,
            "oa_url": null
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_id_from_url_form() {
        assert_eq!(extract_id("https://openalex.org/W3159481202"), "W3159481202");
        assert_eq!(extract_id("W42"), "W42");
    }

    #[test]
    fn test_graph_construction() {
        let mut citations = HashMap::new();
        citations.insert("https://openalex.org/W2".to_string(), record("Citer two"));
        citations.insert("https://openalex.org/W3".to_string(), record("Citer three"));

        let (graph, edges) =
            build_citation_graph("https://openalex.org/W1", &citations, Some("Root paper"));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(edges.len(), 2);
        assert_eq!(graph.node("W1").unwrap().node_type, NodeType::Root);
        assert_eq!(graph.node("W1").unwrap().label, "Root paper");
        assert_eq!(graph.node("W2").unwrap().label, "Citer two");

        // Membership, not order: the underlying sets do not sort
        assert!(edges.contains(&("W2".to_string(), "W1".to_string())));
        assert!(edges.contains(&("W3".to_string(), "W1".to_string())));
        assert_eq!(graph.citation_count("W1"), 2);
    }

    #[test]
    fn test_no_self_loop_for_root_identifier() {
        let mut citations = HashMap::new();
        citations.insert("https://openalex.org/W1".to_string(), record("The root itself"));
        citations.insert("https://openalex.org/W2".to_string(), record("A real citer"));

        let (graph, edges) = build_citation_graph("https://openalex.org/W1", &citations, None);

        // 1 root + 1 distinct non-root citer
        assert_eq!(graph.node_count(), 2);
        assert_eq!(edges.len(), 1);
        assert!(!edges.contains(&("W1".to_string(), "W1".to_string())));
        // Root attributes survive even when the root appears among citers
        assert_eq!(graph.node("W1").unwrap().node_type, NodeType::Root);
    }

    #[test]
    fn test_duplicate_raw_identifiers_collapse() {
        let mut citations = HashMap::new();
        citations.insert("https://openalex.org/W2".to_string(), record("From URL form"));
        citations.insert("W2".to_string(), record("From bare form"));

        let (graph, edges) = build_citation_graph("W1", &citations, None);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0], ("W2".to_string(), "W1".to_string()));
    }

    #[test]
    fn test_default_labels() {
        let citations = HashMap::new();
        let (graph, edges) = build_citation_graph("https://openalex.org/W1", &citations, None);

        assert_eq!(graph.node_count(), 1);
        assert!(edges.is_empty());
        assert_eq!(graph.node("W1").unwrap().label, "Paper W1");
    }
}
