use indexmap::IndexSet;
use std::collections::HashMap;
use tracing::info;

use super::Middleware;
use crate::core::{DependencyGraph, GraphError, NodeAttrs};

/// Id of the placeholder node standing for a whole cluster.
pub fn cluster_node_id(cluster_name: &str) -> String {
    format!("cluster_{cluster_name}")
}

/// Replace the edges between two clusters by one edge between placeholders.
///
/// Every edge from a node of cluster A to a node of another cluster B is
/// removed; then, once per distinct (A, B), `cluster_A -> cluster_B` is added.
/// A node listed in several clusters belongs to the last one. Edges touching a
/// node outside every cluster, and edges inside a cluster, stay; clusters
/// sharing a name count as one cluster.
#[derive(Debug, Clone, Copy, Default)]
pub struct CondenseInterClustersEdges;

impl Middleware for CondenseInterClustersEdges {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!("Condensing inter-cluster edges...");

        let cluster_names: Vec<String> = graph
            .clusters()
            .iter()
            .map(|cluster| cluster.name.clone())
            .collect();

        let mut cluster_of: HashMap<&str, usize> = HashMap::new();
        for (index, cluster) in graph.clusters().iter().enumerate() {
            for id in &cluster.nodes {
                cluster_of.insert(id, index);
            }
        }

        let mut crossing: Vec<(String, String)> = Vec::new();
        let mut crossed_pairs: IndexSet<(&str, &str)> = IndexSet::new();
        for (from, to) in graph.edges() {
            if let (Some(&from_cluster), Some(&to_cluster)) =
                (cluster_of.get(from), cluster_of.get(to))
            {
                let from_name = cluster_names[from_cluster].as_str();
                let to_name = cluster_names[to_cluster].as_str();
                if from_name != to_name {
                    crossed_pairs.insert((from_name, to_name));
                    crossing.push((from.to_string(), to.to_string()));
                }
            }
        }

        for (from, to) in &crossing {
            graph.remove_edge(from, to);
        }
        for &(from_name, to_name) in &crossed_pairs {
            let from = cluster_node_id(from_name);
            let to = cluster_node_id(to_name);
            graph.add_node(from.clone(), NodeAttrs::new(from.clone(), from.clone()));
            graph.add_node(to.clone(), NodeAttrs::new(to.clone(), to.clone()));
            graph.add_edge(&from, &to)?;
        }

        info!(
            "Done: {} edges replaced by {} cluster edges.",
            crossing.len(),
            crossed_pairs.len()
        );
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        "Condense inter-clusters edges".to_string()
    }
}
