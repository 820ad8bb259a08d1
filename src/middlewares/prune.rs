use std::collections::HashSet;
use tracing::info;

use super::{Extremity, Middleware};
use crate::core::{DependencyGraph, GraphError};

/// Delete every root (or leaf) except the ids listed in `keep`.
///
/// Runs a single pass: nodes that become roots once the current roots are
/// gone stay in the graph.
#[derive(Debug, Clone)]
pub struct RemoveExtremities {
    extremity: Extremity,
    keep: HashSet<String>,
}

impl RemoveExtremities {
    pub fn new(extremity: Extremity, keep: HashSet<String>) -> Self {
        Self { extremity, keep }
    }

    fn describe_keep(&self) -> String {
        let mut keep: Vec<&str> = self.keep.iter().map(String::as_str).collect();
        keep.sort_unstable();
        keep.iter()
            .map(|id| format!("\"{id}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Middleware for RemoveExtremities {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        if self.keep.is_empty() {
            info!("Removing {} nodes...", self.extremity.as_str());
        } else {
            info!(
                "Removing {} nodes except [{}]...",
                self.extremity.as_str(),
                self.describe_keep()
            );
        }

        let doomed: Vec<String> = self
            .extremity
            .select(&graph)
            .into_iter()
            .filter(|id| !self.keep.contains(id))
            .collect();
        let removed = graph.remove_nodes(doomed.iter().map(String::as_str));

        info!("Done: removed {removed} nodes.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        if self.keep.is_empty() {
            format!("Remove {} nodes", self.extremity.as_str())
        } else {
            format!(
                "Remove {} nodes but [{}]",
                self.extremity.as_str(),
                self.describe_keep()
            )
        }
    }
}
