use tracing::info;

use super::{Direction, Extremity, Middleware};
use crate::core::{DependencyGraph, GraphError};

/// Color a node and everything above or below it.
#[derive(Debug, Clone)]
pub struct HighlightReachable {
    root: String,
    color: String,
    direction: Direction,
}

impl HighlightReachable {
    pub fn new(root: impl Into<String>, color: impl Into<String>, direction: Direction) -> Self {
        Self {
            root: root.into(),
            color: color.into(),
            direction,
        }
    }
}

impl Middleware for HighlightReachable {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!(
            "Highlighting {} of \"{}\" in {}...",
            self.direction.as_str(),
            self.root,
            self.color
        );

        let reachable = self.direction.reachable(&graph, &self.root)?;
        graph.set_color(&self.root, &self.color)?;
        for id in &reachable {
            graph.set_color(id, &self.color)?;
        }

        info!("Done.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        format!(
            "Highlight {} of \"{}\" in {}",
            self.direction.as_str(),
            self.root,
            self.color
        )
    }
}

/// Color every root, or every leaf.
#[derive(Debug, Clone)]
pub struct HighlightExtremities {
    color: String,
    extremity: Extremity,
}

impl HighlightExtremities {
    pub fn new(color: impl Into<String>, extremity: Extremity) -> Self {
        Self {
            color: color.into(),
            extremity,
        }
    }
}

impl Middleware for HighlightExtremities {
    fn transform(&self, mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!(
            "Highlighting {} nodes in {}...",
            self.extremity.as_str(),
            self.color
        );

        for id in self.extremity.select(&graph) {
            graph.set_color(&id, &self.color)?;
        }

        info!("Done.");
        Ok(graph)
    }

    fn middleware_name(&self) -> String {
        format!("Highlight {} nodes in {}", self.extremity.as_str(), self.color)
    }
}
