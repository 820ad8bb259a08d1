use indexmap::{IndexMap, IndexSet};
use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use super::error::GraphError;

/// Display attributes carried by every node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NodeAttrs {
    pub fn new(long_name: impl Into<String>, pretty_name: impl Into<String>) -> Self {
        Self {
            long_name: Some(long_name.into()),
            pretty_name: Some(pretty_name.into()),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Overwrite the fields set in `other`, keep the rest.
    pub fn merge(&mut self, other: NodeAttrs) {
        if other.long_name.is_some() {
            self.long_name = other.long_name;
        }
        if other.pretty_name.is_some() {
            self.pretty_name = other.pretty_name;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub attrs: NodeAttrs,
}

impl Node {
    /// The `pretty_name` if one was assigned, the node id otherwise.
    pub fn label(&self) -> &str {
        self.attrs.pretty_name.as_deref().unwrap_or(&self.id)
    }
}

/// A named group of node ids, snapshotted when the cluster is built.
///
/// Clusters refer to nodes by id only. Removing a node from the graph does not
/// touch the clusters, so consumers go through [`Cluster::resolved_nodes`] to
/// skip ids that no longer exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub nodes: IndexSet<String>,
    pub edges: IndexSet<(String, String)>,
}

impl Cluster {
    /// Build the cluster induced by `members`: the members themselves and every
    /// edge of `graph` with both endpoints among them.
    pub fn induced(
        name: impl Into<String>,
        graph: &DependencyGraph,
        members: IndexSet<String>,
    ) -> Self {
        let edges = graph
            .edges()
            .filter(|(from, to)| members.contains(*from) && members.contains(*to))
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            name: name.into(),
            nodes: members,
            edges,
        }
    }

    pub fn resolved_nodes<'a>(
        &'a self,
        graph: &'a DependencyGraph,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.nodes
            .iter()
            .map(String::as_str)
            .filter(move |id| graph.has_node(id))
    }

    pub fn resolved_edges<'a>(
        &'a self,
        graph: &'a DependencyGraph,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.edges
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .filter(move |(from, to)| graph.has_edge(from, to))
    }
}

/// petgraph view of a [`DependencyGraph`], weights are node ids.
pub type IdGraph = Graph<String, (), Directed>;

#[derive(Debug, Clone)]
struct NodeEntry {
    node: Node,
    successors: IndexSet<String>,
    predecessors: IndexSet<String>,
}

/// Directed dependency graph keyed by node id.
///
/// Nodes, and the successors of each node, iterate in insertion order; removals
/// keep the relative order of what remains. An edge `a -> b` reads "a depends
/// on b".
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    entries: IndexMap<String, NodeEntry>,
    edge_count: usize,
    clusters: Vec<Cluster>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or merge `attrs` into the existing one.
    pub fn add_node(&mut self, id: impl Into<String>, attrs: NodeAttrs) {
        let id = id.into();
        match self.entries.get_mut(&id) {
            Some(entry) => entry.node.attrs.merge(attrs),
            None => {
                let node = Node {
                    id: id.clone(),
                    attrs,
                };
                self.entries.insert(
                    id,
                    NodeEntry {
                        node,
                        successors: IndexSet::new(),
                        predecessors: IndexSet::new(),
                    },
                );
            }
        }
    }

    /// Add `from -> to`. Returns `Ok(false)` if the edge was already there.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool, GraphError> {
        if !self.entries.contains_key(to) {
            return Err(GraphError::missing(to));
        }
        let inserted = match self.entries.get_mut(from) {
            Some(entry) => entry.successors.insert(to.to_string()),
            None => return Err(GraphError::missing(from)),
        };
        if inserted {
            if let Some(entry) = self.entries.get_mut(to) {
                entry.predecessors.insert(from.to_string());
            }
            self.edge_count += 1;
        }
        Ok(inserted)
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let removed = self
            .entries
            .get_mut(from)
            .map(|entry| entry.successors.shift_remove(to))
            .unwrap_or(false);
        if removed {
            if let Some(entry) = self.entries.get_mut(to) {
                entry.predecessors.shift_remove(from);
            }
            self.edge_count -= 1;
        }
        removed
    }

    /// Remove a node and its incident edges. Clusters are left untouched.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.shift_remove(id) else {
            return false;
        };

        for succ in &entry.successors {
            if let Some(other) = self.entries.get_mut(succ) {
                other.predecessors.shift_remove(id);
            }
        }
        for pred in &entry.predecessors {
            if let Some(other) = self.entries.get_mut(pred) {
                other.successors.shift_remove(id);
            }
        }
        // a self-loop shows up on both sides but is a single edge
        let self_loop = entry.successors.contains(id);
        self.edge_count -=
            entry.successors.len() + entry.predecessors.len() - usize::from(self_loop);
        true
    }

    /// Remove every node in `ids` in one linear pass.
    pub fn remove_nodes<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let doomed: HashSet<&str> = ids.into_iter().collect();
        let before = self.entries.len();

        self.entries.retain(|id, _| !doomed.contains(id.as_str()));
        let mut edge_count = 0;
        for entry in self.entries.values_mut() {
            entry.successors.retain(|id| !doomed.contains(id.as_str()));
            entry.predecessors.retain(|id| !doomed.contains(id.as_str()));
            edge_count += entry.successors.len();
        }
        self.edge_count = edge_count;

        before - self.entries.len()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.entries
            .get(from)
            .map(|entry| entry.successors.contains(to))
            .unwrap_or(false)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.entries.get(id).map(|entry| &entry.node)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.entries.get_mut(id).map(|entry| &mut entry.node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.entries.values().map(|entry| &entry.node)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Edges in node-major order: each node's successors, nodes in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(from, entry)| {
            entry
                .successors
                .iter()
                .map(move |to| (from.as_str(), to.as_str()))
        })
    }

    pub fn successors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.entries
            .get(id)
            .into_iter()
            .flat_map(|entry| entry.successors.iter().map(String::as_str))
    }

    pub fn predecessors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.entries
            .get(id)
            .into_iter()
            .flat_map(|entry| entry.predecessors.iter().map(String::as_str))
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.entries.get(id).map_or(0, |entry| entry.predecessors.len())
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.entries.get(id).map_or(0, |entry| entry.successors.len())
    }

    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nodes that depend, directly or not, on `id`. Never contains `id`.
    pub fn ancestors(&self, id: &str) -> Result<IndexSet<String>, GraphError> {
        self.reachable(id, |entry| &entry.predecessors)
    }

    /// Nodes `id` depends on, directly or not. Never contains `id`.
    pub fn descendants(&self, id: &str) -> Result<IndexSet<String>, GraphError> {
        self.reachable(id, |entry| &entry.successors)
    }

    fn reachable<F>(&self, id: &str, next: F) -> Result<IndexSet<String>, GraphError>
    where
        F: Fn(&NodeEntry) -> &IndexSet<String>,
    {
        if !self.entries.contains_key(id) {
            return Err(GraphError::missing(id));
        }

        let mut seen: IndexSet<String> = IndexSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            let Some(entry) = self.entries.get(current) else {
                continue;
            };
            for neighbour in next(entry) {
                if neighbour != id && seen.insert(neighbour.clone()) {
                    queue.push_back(neighbour);
                }
            }
        }

        Ok(seen)
    }

    /// Set the `color` attribute of `id`.
    pub fn set_color(&mut self, id: &str, color: &str) -> Result<(), GraphError> {
        let node = self.node_mut(id).ok_or_else(|| GraphError::missing(id))?;
        node.attrs.color = Some(color.to_string());
        Ok(())
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn push_cluster(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    pub fn take_clusters(&mut self) -> Vec<Cluster> {
        std::mem::take(&mut self.clusters)
    }

    pub fn set_clusters(&mut self, clusters: Vec<Cluster>) {
        self.clusters = clusters;
    }

    /// petgraph copy of the topology, with the id → index mapping.
    ///
    /// Node indices follow insertion order.
    pub fn to_petgraph(&self) -> (IdGraph, HashMap<String, NodeIndex>) {
        let mut graph = IdGraph::with_capacity(self.node_count(), self.edge_count());
        let mut index_of = HashMap::with_capacity(self.node_count());

        for id in self.node_ids() {
            let index = graph.add_node(id.to_string());
            index_of.insert(id.to_string(), index);
        }
        for (from, to) in self.edges() {
            graph.add_edge(index_of[from], index_of[to], ());
        }

        (graph, index_of)
    }
}
