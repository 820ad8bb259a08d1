//! Transitive reduction of a dependency DAG.
//!
//! An edge `u -> v` is dropped when `v` can also be reached from `u` through
//! another successor of `u`; what is left is the smallest edge set with the
//! same reachability. Graphs with a cycle have no unique reduction, so a cycle
//! is reported instead.

use fixedbitset::FixedBitSet;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{error, info};

use super::Middleware;
use crate::core::graph::IdGraph;
use crate::core::{DependencyGraph, GraphError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TransitiveReduction;

impl Middleware for TransitiveReduction {
    fn transform(&self, graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
        info!("Computing transitive reduction...");
        let reduced = transitive_reduction(graph).inspect_err(|err| error!("{err}"))?;
        info!("Done: {} edges left.", reduced.edge_count());
        Ok(reduced)
    }

    fn middleware_name(&self) -> String {
        "Transitive reduction".to_string()
    }
}

/// Reduce `graph`, carrying its nodes, their attributes and its clusters over.
pub fn transitive_reduction(mut graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
    let (topology, index_of) = graph.to_petgraph();

    let order = toposort(&topology, None).map_err(|cycle| GraphError::Cycle {
        cycle: find_cycle(&topology, cycle.node_id()),
    })?;

    // reachable[v]: every node reachable from v, v excluded
    let node_count = topology.node_count();
    let mut reachable: Vec<FixedBitSet> = vec![FixedBitSet::new(); node_count];
    for &node in order.iter().rev() {
        let mut set = FixedBitSet::with_capacity(node_count);
        for succ in topology.neighbors(node) {
            set.insert(succ.index());
            set.union_with(&reachable[succ.index()]);
        }
        reachable[node.index()] = set;
    }

    let mut reduced = DependencyGraph::new();
    for node in graph.nodes() {
        reduced.add_node(node.id.clone(), node.attrs.clone());
    }
    for (from, to) in graph.edges() {
        let from_index = index_of[from];
        let to_index = index_of[to];
        let redundant = topology.neighbors(from_index).any(|other| {
            other != to_index && reachable[other.index()].contains(to_index.index())
        });
        if !redundant {
            reduced.add_edge(from, to)?;
        }
    }

    reduced.set_clusters(graph.take_clusters());
    Ok(reduced)
}

/// A closed path `a -> b -> ... -> a` through `start`, or through the first
/// cyclic component if `start` turns out not to be on a cycle.
pub fn find_cycle(graph: &IdGraph, start: NodeIndex) -> Vec<String> {
    if let Some(cycle) = cycle_through(graph, start) {
        return cycle;
    }
    tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.find_edge(component[0], component[0]).is_some()
        })
        .find_map(|component| cycle_through(graph, component[0]))
        .unwrap_or_default()
}

/// Shortest cycle through `start`, by BFS back to it.
fn cycle_through(graph: &IdGraph, start: NodeIndex) -> Option<Vec<String>> {
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut closing = None;

    'search: while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if next == start {
                closing = Some(current);
                break 'search;
            }
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    let mut cursor = closing?;
    let mut path = vec![cursor];
    while cursor != start {
        cursor = *parent.get(&cursor)?;
        path.push(cursor);
    }
    path.reverse();
    path.push(start);

    Some(path.into_iter().map(|index| graph[index].clone()).collect())
}
