use tracing::info;

use super::{Direction, Middleware};
use crate::core::{DependencyGraph, GraphError};

/// Delete every node that is not an ancestor (or descendant) of `root`.
///
/// `root` is not part of its own reachable set and is deleted as well.
#[derive(Debug, Clone)]
pub struct KeepOnlyReachable {
    root: String,
    direction: Direction,
}

impl KeepOnlyReachable {
    pub fn new(root: impl Into<String>, direction: Direction) -> Self {
        Self {
            root: root.into(),
            direction,
        }
    }
}

impl Middleware for KeepOnlyReachable {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!(
            "Keeping only {} of \"{}\"...",
            self.direction.as_str(),
            self.root
        );

        let reachable = self.direction.reachable(&graph, &self.root)?;
        let doomed: Vec<String> = graph
            .node_ids()
            .filter(|id| !reachable.contains(*id))
            .map(str::to_string)
            .collect();
        let removed = graph.remove_nodes(doomed.iter().map(String::as_str));

        info!("Done: removed {removed} nodes.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        format!(
            "Keep only {} of \"{}\"",
            self.direction.as_str(),
            self.root
        )
    }
}

/// Delete every ancestor (or descendant) of `root`, keeping `root` itself.
#[derive(Debug, Clone)]
pub struct RemoveReachable {
    root: String,
    direction: Direction,
}

impl RemoveReachable {
    pub fn new(root: impl Into<String>, direction: Direction) -> Self {
        Self {
            root: root.into(),
            direction,
        }
    }
}

impl Middleware for RemoveReachable {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!("Removing {} of \"{}\"...", self.direction.as_str(), self.root);

        let reachable = self.direction.reachable(&graph, &self.root)?;
        let removed = graph.remove_nodes(reachable.iter().map(String::as_str));

        info!("Done: removed {removed} nodes.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        format!("Remove {} of \"{}\"", self.direction.as_str(), self.root)
    }
}
