use depgraph::core::{Cluster, DependencyGraph, GraphError, NodeAttrs, Pipeline};
use depgraph::middlewares::{transitive_reduction, Middleware, MiddlewareKind};
use indexmap::IndexSet;

fn graph_of(edges: &[(&str, &str)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for &(from, to) in edges {
        graph.add_node(from, NodeAttrs::new(format!("/src/{from}"), from));
        graph.add_node(to, NodeAttrs::new(format!("/src/{to}"), to));
        graph.add_edge(from, to).unwrap();
    }
    graph
}

fn apply(kind: MiddlewareKind, graph: DependencyGraph) -> Result<DependencyGraph, GraphError> {
    kind.build()?.transform(graph)
}

fn colored(graph: &DependencyGraph) -> Vec<&str> {
    graph
        .nodes()
        .filter(|node| node.attrs.color.is_some())
        .map(|node| node.id.as_str())
        .collect()
}

fn ids(graph: &DependencyGraph) -> Vec<&str> {
    graph.node_ids().collect()
}

fn members(ids: &[&str]) -> IndexSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// a -> b -> c <- d
fn diamond_less() -> DependencyGraph {
    graph_of(&[("a", "b"), ("b", "c"), ("d", "c")])
}

#[test]
fn highlight_ancestors_colors_node_and_dependents() {
    let kind = MiddlewareKind::HighlightAncestorsOf {
        node: "b".to_string(),
        color: "red".to_string(),
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(colored(&graph), vec!["a", "b"]);
    assert_eq!(graph.node("a").unwrap().attrs.color.as_deref(), Some("red"));
}

#[test]
fn highlight_descendants_colors_node_and_dependencies() {
    let kind = MiddlewareKind::HighlightDescendantsOf {
        node: "a".to_string(),
        color: "blue".to_string(),
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(colored(&graph), vec!["a", "b", "c"]);
}

#[test]
fn highlight_of_unknown_node_fails() {
    let kind = MiddlewareKind::HighlightAncestorsOf {
        node: "nope".to_string(),
        color: "red".to_string(),
    };
    assert!(matches!(
        apply(kind, diamond_less()),
        Err(GraphError::MissingNode(ref id)) if id == "nope"
    ));
}

#[test]
fn highlight_roots_and_leaves() {
    let roots = apply(
        MiddlewareKind::HighlightRoots {
            color: "green".to_string(),
        },
        diamond_less(),
    )
    .unwrap();
    assert_eq!(colored(&roots), vec!["a", "d"]);

    let leaves = apply(
        MiddlewareKind::HighlightLeaves {
            color: "green".to_string(),
        },
        diamond_less(),
    )
    .unwrap();
    assert_eq!(colored(&leaves), vec!["c"]);
}

#[test]
fn self_loop_does_not_prevent_being_a_root() {
    let graph = graph_of(&[("x", "x"), ("x", "y")]);
    let graph = apply(
        MiddlewareKind::HighlightRoots {
            color: "red".to_string(),
        },
        graph,
    )
    .unwrap();
    assert_eq!(colored(&graph), vec!["x"]);
}

#[test]
fn keep_only_ancestors_drops_the_target_too() {
    let kind = MiddlewareKind::KeepOnlyAncestorsOf {
        node: "c".to_string(),
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(ids(&graph), vec!["a", "b", "d"]);
    assert_eq!(graph.edges().collect::<Vec<_>>(), vec![("a", "b")]);
}

#[test]
fn keep_only_descendants() {
    let kind = MiddlewareKind::KeepOnlyDescendantsOf {
        node: "a".to_string(),
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(ids(&graph), vec!["b", "c"]);
}

#[test]
fn keep_only_both_ways_loses_the_target() {
    let stages = [
        MiddlewareKind::KeepOnlyAncestorsOf {
            node: "b".to_string(),
        },
        MiddlewareKind::KeepOnlyDescendantsOf {
            node: "b".to_string(),
        },
    ];
    let built: Vec<Box<dyn Middleware>> = stages.iter().map(|kind| kind.build().unwrap()).collect();

    let err = Pipeline::apply(diamond_less(), &built).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GraphError>(),
        Some(GraphError::MissingNode(id)) if id == "b"
    ));
}

#[test]
fn remove_ancestors_keeps_the_target() {
    let kind = MiddlewareKind::RemoveAncestorsOf {
        node: "c".to_string(),
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(ids(&graph), vec!["c"]);
}

#[test]
fn remove_descendants() {
    let kind = MiddlewareKind::RemoveDescendantsOf {
        node: "b".to_string(),
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(ids(&graph), vec!["a", "b", "d"]);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn remove_roots_is_a_single_pass() {
    let kind = MiddlewareKind::RemoveRoots { keep: Vec::new() };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(ids(&graph), vec!["b", "c"]);
    assert!(graph.has_edge("b", "c"));
}

#[test]
fn remove_roots_honours_the_keep_list() {
    let kind = MiddlewareKind::RemoveRoots {
        keep: vec!["d".to_string()],
    };
    let graph = apply(kind, diamond_less()).unwrap();

    assert_eq!(ids(&graph), vec!["b", "c", "d"]);
}

#[test]
fn remove_leaves_with_keep_list() {
    let graph = graph_of(&[("a", "b"), ("a", "c")]);
    let kind = MiddlewareKind::RemoveLeaves {
        keep: vec!["c".to_string()],
    };
    let graph = apply(kind, graph).unwrap();

    assert_eq!(ids(&graph), vec!["a", "c"]);
}

#[test]
fn regex_cluster_groups_matching_long_names() {
    let mut graph = graph_of(&[("X", "Y"), ("Y", "Z")]);
    graph.add_node("X", NodeAttrs::new("/lib/X", "X"));
    graph.add_node("Y", NodeAttrs::new("/lib/Y", "Y"));
    graph.add_node("bare", NodeAttrs::default());

    let kind = MiddlewareKind::RegexCluster {
        patterns: vec!["^/lib/".to_string(), "nothing-matches".to_string()],
    };
    let graph = apply(kind, graph).unwrap();

    assert_eq!(graph.clusters().len(), 1);
    let cluster = &graph.clusters()[0];
    assert_eq!(cluster.name, "^/lib/");
    assert_eq!(cluster.nodes, members(&["X", "Y"]));
    assert_eq!(
        cluster.edges.iter().cloned().collect::<Vec<_>>(),
        vec![("X".to_string(), "Y".to_string())]
    );
}

#[test]
fn cluster_regex_makes_one_cluster_from_all_patterns() {
    let graph = graph_of(&[("alpha", "beta"), ("beta", "gamma")]);
    let kind = MiddlewareKind::ClusterRegex {
        patterns: vec!["^al".to_string(), "^ga".to_string()],
    };
    let graph = apply(kind, graph).unwrap();

    assert_eq!(graph.clusters().len(), 1);
    let cluster = &graph.clusters()[0];
    assert_eq!(cluster.name, "/^al/-/^ga/");
    assert_eq!(cluster.nodes, members(&["alpha", "gamma"]));
    assert!(cluster.edges.is_empty());
}

#[test]
fn cluster_regex_without_match_adds_nothing() {
    let kind = MiddlewareKind::ClusterRegex {
        patterns: vec!["zzz".to_string()],
    };
    let graph = apply(kind, diamond_less()).unwrap();
    assert!(graph.clusters().is_empty());
}

#[test]
fn invalid_cluster_regex_is_reported() {
    let kind = MiddlewareKind::RegexCluster {
        patterns: vec!["[unclosed".to_string()],
    };
    assert!(matches!(
        kind.build().err(),
        Some(GraphError::InvalidRegex { ref pattern, .. }) if pattern == "[unclosed"
    ));
}

#[test]
fn transitive_reduction_drops_implied_edges() {
    let graph = graph_of(&[("a", "b"), ("a", "c"), ("b", "c"), ("c", "d"), ("a", "d")]);
    let reduced = transitive_reduction(graph).unwrap();

    assert_eq!(
        reduced.edges().collect::<Vec<_>>(),
        vec![("a", "b"), ("b", "c"), ("c", "d")]
    );
    assert_eq!(reduced.node_count(), 4);
    assert_eq!(
        reduced.node("a").unwrap().attrs.long_name.as_deref(),
        Some("/src/a")
    );
}

#[test]
fn transitive_reduction_is_idempotent() {
    let graph = graph_of(&[("a", "b"), ("b", "c"), ("a", "c"), ("d", "c")]);
    let once = transitive_reduction(graph).unwrap();
    let once_edges: Vec<(String, String)> = once
        .edges()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

    let twice = transitive_reduction(once).unwrap();
    let twice_edges: Vec<(String, String)> = twice
        .edges()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    assert_eq!(once_edges, twice_edges);
}

#[test]
fn transitive_reduction_keeps_clusters() {
    let mut graph = graph_of(&[("a", "b"), ("b", "c"), ("a", "c")]);
    let cluster = Cluster::induced("ab", &graph, members(&["a", "b"]));
    graph.push_cluster(cluster);

    let reduced = transitive_reduction(graph).unwrap();

    assert_eq!(reduced.clusters().len(), 1);
    assert_eq!(reduced.clusters()[0].name, "ab");
}

#[test]
fn transitive_reduction_reports_cycles() {
    let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);

    let err = apply(MiddlewareKind::TransitiveReduction, graph).unwrap_err();
    let GraphError::Cycle { cycle } = &err else {
        panic!("expected a cycle, got {err:?}");
    };
    assert_eq!(cycle.len(), 4);
    assert_eq!(cycle.first(), cycle.last());
    let mut on_cycle: Vec<&str> = cycle[..3].iter().map(String::as_str).collect();
    on_cycle.sort();
    assert_eq!(on_cycle, vec!["a", "b", "c"]);
}

#[test]
fn self_loop_is_a_cycle() {
    let graph = graph_of(&[("a", "a")]);
    let err = transitive_reduction(graph).unwrap_err();
    assert!(matches!(err, GraphError::Cycle { ref cycle } if cycle == &["a", "a"]));
}

#[test]
fn condensation_replaces_crossing_edges_by_one_cluster_edge() {
    let mut graph = graph_of(&[
        ("a1", "b1"),
        ("a2", "b2"),
        ("a1", "a2"),
        ("a1", "z"),
    ]);
    graph.push_cluster(Cluster::induced("C1", &graph, members(&["a1", "a2"])));
    graph.push_cluster(Cluster::induced("C2", &graph, members(&["b1", "b2"])));

    let graph = apply(MiddlewareKind::CondenseInterClustersEdges, graph).unwrap();

    assert!(!graph.has_edge("a1", "b1"));
    assert!(!graph.has_edge("a2", "b2"));
    assert!(graph.has_edge("a1", "a2"));
    assert!(graph.has_edge("a1", "z"));
    assert!(graph.has_edge("cluster_C1", "cluster_C2"));
    assert_eq!(graph.edge_count(), 3);

    let placeholder = graph.node("cluster_C1").unwrap();
    assert_eq!(placeholder.attrs.pretty_name.as_deref(), Some("cluster_C1"));
}

#[test]
fn condensation_treats_clusters_sharing_a_name_as_one() {
    let mut graph = graph_of(&[("a", "b"), ("b", "c")]);
    graph.push_cluster(Cluster::induced("foo", &graph, members(&["a"])));
    graph.push_cluster(Cluster::induced("foo", &graph, members(&["b"])));

    let graph = apply(MiddlewareKind::CondenseInterClustersEdges, graph).unwrap();

    assert!(graph.has_edge("a", "b"));
    assert!(graph.has_edge("b", "c"));
    assert!(!graph.has_node("cluster_foo"));
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn condensation_without_clusters_is_a_no_op() {
    let graph = apply(MiddlewareKind::CondenseInterClustersEdges, diamond_less()).unwrap();
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.node_count(), 4);
}

#[test]
fn stage_names_describe_their_parameters() {
    let kind = MiddlewareKind::RemoveRoots {
        keep: vec!["b".to_string(), "a".to_string()],
    };
    assert_eq!(
        kind.build().unwrap().middleware_name(),
        "Remove root nodes but [\"a\", \"b\"]"
    );
    assert_eq!(
        MiddlewareKind::TransitiveReduction
            .build()
            .unwrap()
            .middleware_name(),
        "Transitive reduction"
    );
}
