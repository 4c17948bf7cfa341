//! Render export for the visualization boundary
//!
//! The actual renderers are opaque to this crate: a Graphviz DOT document
//! serves static rendering, and a flat `{nodes, edges}` JSON document serves
//! interactive viewers. Output order follows graph iteration order and is
//! not guaranteed stable.

use crate::builder::{CitationGraph, NodeType};
use serde_json::{json, Value};

/// Render the graph as a Graphviz DOT document
pub fn to_dot(graph: &CitationGraph) -> String {
    let mut out = String::from("digraph citations {\n");
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [style=filled];\n");

    for (id, node) in graph.nodes() {
        let fill = match node.node_type {
            NodeType::Root => "red",
            NodeType::Cited => "lightblue",
        };
        out.push_str(&format!(
            "    \"{}\" [label=\"{}\", fillcolor={}];\n",
            escape(id),
            escape(&node.label),
            fill
        ));
    }

    for (id, _) in graph.nodes() {
        for citing in graph.citers_of(id) {
            out.push_str(&format!("    \"{}\" -> \"{}\";\n", escape(citing), escape(id)));
        }
    }

    out.push_str("}\n");
    out
}

/// Render the graph and edge list as a node/edge JSON document
pub fn to_json(graph: &CitationGraph, edges: &[(String, String)]) -> Value {
    let nodes: Vec<Value> = graph
        .nodes()
        .map(|(id, node)| {
            json!({
                "id": id,
                "label": node.label,
                "type": node.node_type.as_str(),
            })
        })
        .collect();

    let edge_list: Vec<Value> = edges
        .iter()
        .map(|(citing, cited)| json!({ "source": citing, "target": cited }))
        .collect();

    json!({ "nodes": nodes, "edges": edge_list })
}

/// Escape `"` and `\` for DOT string literals
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
