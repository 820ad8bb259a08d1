use indexmap::IndexSet;
use regex::Regex;
use tracing::{debug, info};

use super::Middleware;
use crate::core::{Cluster, DependencyGraph, GraphError};

fn describe(regexes: &[Regex]) -> String {
    regexes
        .iter()
        .map(|regex| format!("\"{}\"", regex.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One cluster per regex, over the nodes whose `long_name` matches it.
///
/// Nodes without a `long_name` never match. A regex matching nothing adds no
/// cluster.
#[derive(Debug, Clone)]
pub struct RegexCluster {
    regexes: Vec<Regex>,
}

impl RegexCluster {
    pub fn new(regexes: Vec<Regex>) -> Self {
        Self { regexes }
    }
}

impl Middleware for RegexCluster {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        for regex in &self.regexes {
            info!("Clustering nodes with /{}/...", regex.as_str());

            let members: IndexSet<String> = graph
                .nodes()
                .filter(|node| {
                    node.attrs
                        .long_name
                        .as_deref()
                        .is_some_and(|long_name| regex.is_match(long_name))
                })
                .map(|node| node.id.clone())
                .collect();

            if members.is_empty() {
                info!("Empty cluster: /{}/", regex.as_str());
                continue;
            }
            let cluster = Cluster::induced(regex.as_str(), &graph, members);
            info!("Cluster contains {} nodes.", cluster.nodes.len());
            graph.push_cluster(cluster);
        }

        info!("Done.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        format!("Regex cluster [{}]", describe(&self.regexes))
    }
}

/// A single cluster of the nodes whose id matches any of the regexes.
///
/// The cluster is named after all the regexes: `/a/-/b/`.
#[derive(Debug, Clone)]
pub struct ClusterRegex {
    regexes: Vec<Regex>,
}

impl ClusterRegex {
    pub fn new(regexes: Vec<Regex>) -> Self {
        Self { regexes }
    }

    pub fn cluster_name(&self) -> String {
        self.regexes
            .iter()
            .map(|regex| format!("/{}/", regex.as_str()))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl Middleware for ClusterRegex {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!("Clustering nodes with [{}]", describe(&self.regexes));
        let name = self.cluster_name();
        debug!("Cluster name: {name}");

        let mut members: IndexSet<String> = IndexSet::new();
        for regex in &self.regexes {
            debug!("Adding nodes with /{}/...", regex.as_str());
            members.extend(
                graph
                    .node_ids()
                    .filter(|id| regex.is_match(id))
                    .map(str::to_string),
            );
        }

        if members.is_empty() {
            info!("Empty cluster: {name}");
        } else {
            info!("Cluster contains {} nodes.", members.len());
            let cluster = Cluster::induced(name, &graph, members);
            graph.push_cluster(cluster);
        }

        info!("Done.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        format!("Cluster regex [{}]", describe(&self.regexes))
    }
}
