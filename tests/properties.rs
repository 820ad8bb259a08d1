use depgraph::core::names::short_name_mapping;
use depgraph::core::{DependencyGraph, GraphError, NodeAttrs};
use depgraph::middlewares::transitive_reduction;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn build(node_count: usize, edges: &[(usize, usize)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for i in 0..node_count {
        graph.add_node(format!("n{i}"), NodeAttrs::default());
    }
    for &(from, to) in edges {
        graph
            .add_edge(&format!("n{from}"), &format!("n{to}"))
            .unwrap();
    }
    graph
}

fn any_graph() -> impl Strategy<Value = DependencyGraph> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..30).prop_map(move |edges| build(n, &edges))
    })
}

/// Edges only go from a lower to a higher index, so the graph is acyclic.
fn any_dag() -> impl Strategy<Value = DependencyGraph> {
    (2usize..12).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..30).prop_map(move |pairs| {
            let edges: Vec<(usize, usize)> = pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect();
            build(n, &edges)
        })
    })
}

fn closure(graph: &DependencyGraph) -> BTreeSet<(String, String)> {
    graph
        .node_ids()
        .flat_map(|id| {
            graph
                .descendants(id)
                .unwrap()
                .into_iter()
                .map(move |other| (id.to_string(), other))
        })
        .collect()
}

fn edge_set(graph: &DependencyGraph) -> BTreeSet<(String, String)> {
    graph
        .edges()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

proptest! {
    #[test]
    fn a_node_is_never_its_own_ancestor_or_descendant(graph in any_graph()) {
        for id in graph.node_ids() {
            prop_assert!(!graph.ancestors(id).unwrap().contains(id));
            prop_assert!(!graph.descendants(id).unwrap().contains(id));
        }
    }

    #[test]
    fn ancestors_and_descendants_mirror_each_other(graph in any_graph()) {
        for id in graph.node_ids() {
            for descendant in graph.descendants(id).unwrap() {
                prop_assert!(graph.ancestors(&descendant).unwrap().contains(id));
            }
        }
    }

    #[test]
    fn reduction_preserves_reachability_and_is_idempotent(graph in any_dag()) {
        let before = closure(&graph);
        let reduced = transitive_reduction(graph).unwrap();
        prop_assert_eq!(&closure(&reduced), &before);

        let reduced_edges = edge_set(&reduced);
        let again = transitive_reduction(reduced).unwrap();
        prop_assert_eq!(edge_set(&again), reduced_edges);
    }

    #[test]
    fn reduction_rejects_every_cycle(graph in any_graph()) {
        let cyclic = graph.node_ids().any(|id| {
            graph.has_edge(id, id)
                || graph
                    .descendants(id)
                    .unwrap()
                    .iter()
                    .any(|other| graph.has_edge(other, id))
        });
        match transitive_reduction(graph) {
            Err(GraphError::Cycle { cycle }) => {
                prop_assert!(cyclic);
                prop_assert!(cycle.len() >= 2);
                prop_assert_eq!(cycle.first(), cycle.last());
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
            Ok(_) => prop_assert!(!cyclic),
        }
    }

    #[test]
    fn short_names_are_unique(
        segments in prop::collection::vec(
            prop::collection::vec("[a-c]{1,2}", 1..4),
            1..12,
        )
    ) {
        let paths: Vec<String> = segments
            .iter()
            .map(|parts| format!("/root/{}", parts.join("/")))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mapping = short_name_mapping(paths.iter().map(String::as_str));

        prop_assert_eq!(mapping.len(), paths.len());
        let labels: HashSet<&String> = mapping.values().collect();
        prop_assert_eq!(labels.len(), paths.len());
        for (path, label) in &mapping {
            prop_assert!(path.ends_with(label.as_str()));
        }
    }
}
