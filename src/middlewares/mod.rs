//! Graph transformations applied between extraction and rendering.
//!
//! Every stage takes the graph by value and hands it back, mutated or
//! replaced. Stages naming a node fail with [`GraphError::MissingNode`] when
//! the node is not in the graph.

pub mod cluster;
pub mod condense;
pub mod highlight;
pub mod prune;
pub mod reachability;
pub mod reduction;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::error;

use crate::core::error::compile_regex;
use crate::core::{DependencyGraph, GraphError};

pub use cluster::{ClusterRegex, RegexCluster};
pub use condense::CondenseInterClustersEdges;
pub use highlight::{HighlightExtremities, HighlightReachable};
pub use prune::RemoveExtremities;
pub use reachability::{KeepOnlyReachable, RemoveReachable};
pub use reduction::{transitive_reduction, TransitiveReduction};

pub trait Middleware {
    fn transform(&self, graph: DependencyGraph) -> Result<DependencyGraph, GraphError>;
    fn middleware_name(&self) -> String;
}

/// Which way reachability is followed from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Nodes depending on the target.
    Ancestors,
    /// Nodes the target depends on.
    Descendants,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ancestors => "ancestors",
            Direction::Descendants => "descendants",
        }
    }

    /// The reachable set of `root`, or a logged `MissingNode` error.
    pub fn reachable(
        self,
        graph: &DependencyGraph,
        root: &str,
    ) -> Result<IndexSet<String>, GraphError> {
        let reachable = match self {
            Direction::Ancestors => graph.ancestors(root),
            Direction::Descendants => graph.descendants(root),
        };
        reachable.inspect_err(|err| error!("{err}"))
    }
}

/// Nodes with nothing above them (roots) or nothing below them (leaves).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremity {
    Roots,
    Leaves,
}

impl Extremity {
    pub fn as_str(self) -> &'static str {
        match self {
            Extremity::Roots => "root",
            Extremity::Leaves => "leaf",
        }
    }

    /// Ids of the matching nodes, in graph order.
    ///
    /// A root has an empty ancestor set, which is the case exactly when every
    /// predecessor is the node itself; leaves mirror that on successors.
    pub fn select(self, graph: &DependencyGraph) -> Vec<String> {
        graph
            .node_ids()
            .filter(|id| match self {
                Extremity::Roots => graph.predecessors(id).all(|other| other == *id),
                Extremity::Leaves => graph.successors(id).all(|other| other == *id),
            })
            .map(str::to_string)
            .collect()
    }
}

/// Stage selection, as assembled by the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum MiddlewareKind {
    HighlightAncestorsOf { node: String, color: String },
    HighlightDescendantsOf { node: String, color: String },
    HighlightRoots { color: String },
    HighlightLeaves { color: String },
    KeepOnlyAncestorsOf { node: String },
    KeepOnlyDescendantsOf { node: String },
    RemoveAncestorsOf { node: String },
    RemoveDescendantsOf { node: String },
    RemoveRoots { keep: Vec<String> },
    RemoveLeaves { keep: Vec<String> },
    /// One cluster per regex, matched against `long_name`.
    RegexCluster { patterns: Vec<String> },
    /// A single cluster of the node ids matching any regex.
    ClusterRegex { patterns: Vec<String> },
    TransitiveReduction,
    CondenseInterClustersEdges,
}

impl MiddlewareKind {
    pub fn build(&self) -> Result<Box<dyn Middleware>, GraphError> {
        let keep_set = |keep: &[String]| keep.iter().cloned().collect::<HashSet<_>>();
        let regexes = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| compile_regex(pattern))
                .collect::<Result<Vec<_>, _>>()
        };

        let middleware: Box<dyn Middleware> = match self {
            MiddlewareKind::HighlightAncestorsOf { node, color } => Box::new(
                HighlightReachable::new(node, color, Direction::Ancestors),
            ),
            MiddlewareKind::HighlightDescendantsOf { node, color } => Box::new(
                HighlightReachable::new(node, color, Direction::Descendants),
            ),
            MiddlewareKind::HighlightRoots { color } => {
                Box::new(HighlightExtremities::new(color, Extremity::Roots))
            }
            MiddlewareKind::HighlightLeaves { color } => {
                Box::new(HighlightExtremities::new(color, Extremity::Leaves))
            }
            MiddlewareKind::KeepOnlyAncestorsOf { node } => {
                Box::new(KeepOnlyReachable::new(node, Direction::Ancestors))
            }
            MiddlewareKind::KeepOnlyDescendantsOf { node } => {
                Box::new(KeepOnlyReachable::new(node, Direction::Descendants))
            }
            MiddlewareKind::RemoveAncestorsOf { node } => {
                Box::new(RemoveReachable::new(node, Direction::Ancestors))
            }
            MiddlewareKind::RemoveDescendantsOf { node } => {
                Box::new(RemoveReachable::new(node, Direction::Descendants))
            }
            MiddlewareKind::RemoveRoots { keep } => {
                Box::new(RemoveExtremities::new(Extremity::Roots, keep_set(keep)))
            }
            MiddlewareKind::RemoveLeaves { keep } => {
                Box::new(RemoveExtremities::new(Extremity::Leaves, keep_set(keep)))
            }
            MiddlewareKind::RegexCluster { patterns } => {
                Box::new(RegexCluster::new(regexes(patterns)?))
            }
            MiddlewareKind::ClusterRegex { patterns } => {
                Box::new(ClusterRegex::new(regexes(patterns)?))
            }
            MiddlewareKind::TransitiveReduction => Box::new(TransitiveReduction),
            MiddlewareKind::CondenseInterClustersEdges => Box::new(CondenseInterClustersEdges),
        };
        Ok(middleware)
    }
}
