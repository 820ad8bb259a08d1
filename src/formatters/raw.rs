use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::core::DependencyGraph;

/// Plain enumeration of the graph, one item per line.
///
/// The node count comes first; then, for every node, its id, its attributes
/// as JSON, its number of dependencies and one dependency per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFormatter;

impl RawFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_to_file(&self, graph: &DependencyGraph, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format_graph(graph)?)?;
        Ok(())
    }

    pub fn format_graph(&self, graph: &DependencyGraph) -> Result<String> {
        let mut lines: Vec<String> = Vec::with_capacity(1 + graph.node_count() * 3 + graph.edge_count());
        lines.push(graph.node_count().to_string());

        for node in graph.nodes() {
            lines.push(node.id.clone());
            lines.push(serde_json::to_string(&node.attrs)?);
            lines.push(graph.out_degree(&node.id).to_string());
            lines.extend(graph.successors(&node.id).map(str::to_string));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        Ok(output)
    }
}
