use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::core::DependencyGraph;

pub const DEFAULT_SEED: u64 = 6737;

/// GraphViz output: one box per node, one colored edge bundle per node and
/// one `subgraph cluster_<i>` per cluster.
///
/// Colors come from a seeded generator, so equal graphs render identically.
#[derive(Debug, Clone)]
pub struct DotFormatter {
    horizontal: bool,
    seed: u64,
}

impl DotFormatter {
    pub fn new() -> Self {
        Self {
            horizontal: false,
            seed: DEFAULT_SEED,
        }
    }

    /// Lay the graph out left to right.
    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn format_to_file(&self, graph: &DependencyGraph, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format_graph(graph)?)?;
        Ok(())
    }

    pub fn format_graph(&self, graph: &DependencyGraph) -> Result<String> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = String::new();

        writeln!(out, "digraph G {{")?;
        writeln!(out, "graph [compound=true];")?;
        writeln!(out, "node [shape=box];")?;
        if self.horizontal {
            writeln!(out, "rankdir=LR")?;
        }

        writeln!(out, "\n# Nodes\n")?;
        let mut dot_ids: HashMap<&str, String> = HashMap::with_capacity(graph.node_count());
        for (index, node) in graph.nodes().enumerate() {
            let dot_id = format!("n{index}");
            if node.attrs.pretty_name.is_none() {
                warn!("No \"pretty_name\" for node \"{}\".", node.id);
            }
            match &node.attrs.color {
                Some(color) => writeln!(
                    out,
                    "{dot_id}[label=\"{}\", color=\"{}\"]",
                    escape(node.label()),
                    escape(color)
                )?,
                None => writeln!(out, "{dot_id}[label=\"{}\"]", escape(node.label()))?,
            }
            dot_ids.insert(&node.id, dot_id);
        }

        writeln!(out, "\n# Edges\n")?;
        for node in graph.nodes() {
            if graph.out_degree(&node.id) == 0 {
                continue;
            }
            let color = random_hex_color(&mut rng);
            writeln!(out, "{} -> {{", dot_ids[node.id.as_str()])?;
            for dependency in graph.successors(&node.id) {
                writeln!(out, "  {}", dot_ids[dependency])?;
            }
            writeln!(out, "}}[color=\"{color}\"]")?;
        }

        writeln!(out, "\n# Clusters\n")?;
        for (index, cluster) in graph.clusters().iter().enumerate() {
            writeln!(out, "subgraph cluster_{index} {{")?;
            writeln!(out, "  label=\"{}\"", escape(&cluster.name))?;
            writeln!(out, "  color=\"{}\";", random_hex_color(&mut rng))?;
            writeln!(out)?;
            for id in cluster.resolved_nodes(graph) {
                writeln!(out, "  \"{}\"", dot_ids[id])?;
            }
            writeln!(out, "}}")?;
        }

        writeln!(out, "}}")?;
        Ok(out)
    }
}

impl Default for DotFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn random_hex_color(rng: &mut StdRng) -> String {
    let [r, g, b]: [u8; 3] = rng.gen();
    format!("#{r:02X}{g:02X}{b:02X}")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
