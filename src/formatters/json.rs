use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::DependencyGraph;

/// JSON document with nodes listed once and edges and clusters referring to
/// them by position.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_to_file(&self, graph: &DependencyGraph, output_path: &Path) -> Result<()> {
        let json_content = self.format_graph(graph)?;
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format_graph(&self, graph: &DependencyGraph) -> Result<String> {
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(graph.node_count());
        let mut nodes = Vec::with_capacity(graph.node_count());
        for (position, node) in graph.nodes().enumerate() {
            positions.insert(&node.id, position);

            let mut node_json = json!({ "id": node.id });
            if let Some(long_name) = &node.attrs.long_name {
                node_json["long_name"] = json!(long_name);
            }
            if let Some(pretty_name) = &node.attrs.pretty_name {
                node_json["pretty_name"] = json!(pretty_name);
            }
            if let Some(color) = &node.attrs.color {
                node_json["color"] = json!(color);
            }
            nodes.push(node_json);
        }

        let edges: Vec<Value> = graph
            .edges()
            .map(|(from, to)| json!([positions[from], positions[to]]))
            .collect();

        let clusters: Vec<Value> = graph
            .clusters()
            .iter()
            .map(|cluster| {
                let members: Vec<usize> = cluster
                    .resolved_nodes(graph)
                    .map(|id| positions[id])
                    .collect();
                let cluster_edges: Vec<Value> = cluster
                    .resolved_edges(graph)
                    .map(|(from, to)| json!([positions[from], positions[to]]))
                    .collect();
                json!({ "name": cluster.name, "nodes": members, "edges": cluster_edges })
            })
            .collect();

        let output = json!({
            "meta": {
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "clusters": clusters.len()
            },
            "nodes": nodes,
            "edges": edges,
            "clusters": clusters
        });

        Ok(serde_json::to_string(&output)?)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
