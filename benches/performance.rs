use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depgraph::core::{DependencyGraph, NodeAttrs};
use depgraph::frontends::hol4_thms::TheoremScanner;
use depgraph::frontends::FrontEndKind;
use depgraph::middlewares::transitive_reduction;
use std::collections::HashSet;

fn benchmark_module_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("module_extraction");

    // Synthetic Holmake tree: module i depends on the previous five
    let test_dir = tempfile::TempDir::new().unwrap();
    let root = test_dir.path().canonicalize().unwrap();
    for i in 0..200 {
        let dir = root.join(format!("part{}", i % 10));
        std::fs::create_dir_all(&dir).unwrap();
        let content: Vec<String> = (i.saturating_sub(5)..i)
            .map(|j| format!("{}/part{}/m{}Theory.uo", root.display(), j % 10, j))
            .collect();
        std::fs::write(dir.join(format!("m{i}Theory.uo")), content.join("\n")).unwrap();
    }

    let frontend = FrontEndKind::Hol4 {
        src_root: root.clone(),
        filter_files: None,
        exclude_dependencies: None,
        keep_dependencies: None,
    };

    group.bench_function("hol4_200_modules", |b| {
        b.iter(|| {
            let graph = frontend.build().unwrap().dependency_graph().unwrap();
            black_box(graph)
        });
    });

    group.finish();
}

fn benchmark_theorem_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("theorem_scanner");

    let scanner = TheoremScanner::new().unwrap();
    let known: HashSet<String> = (0..300).map(|i| format!("THM_{i}")).collect();
    let script: String = (0..300)
        .map(|i| {
            format!(
                "val THM_{i} = store_thm(\"THM_{i}\", ``x = {i}``,\n  (* step {i} *)\n  rw [THM_{}, THM_{}] >> metis_tac []);\n",
                i / 2,
                i / 3
            )
        })
        .collect();

    group.bench_function("strip_comments", |b| {
        b.iter(|| black_box(scanner.strip_comments(black_box(&script))));
    });

    let stripped = scanner.strip_comments(&script);
    group.bench_function("dependencies_300_theorems", |b| {
        b.iter(|| black_box(scanner.dependencies(black_box(&stripped), &known)));
    });

    group.finish();
}

fn benchmark_transitive_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_reduction");

    // Layered DAG where every node depends on everything two layers below
    let mut graph = DependencyGraph::new();
    let layers = 20;
    let width = 10;
    for layer in 0..layers {
        for k in 0..width {
            graph.add_node(format!("l{layer}_{k}"), NodeAttrs::default());
        }
    }
    for layer in 0..layers - 1 {
        for below in layer + 1..(layer + 3).min(layers) {
            for k in 0..width {
                for m in 0..width {
                    graph
                        .add_edge(&format!("l{layer}_{k}"), &format!("l{below}_{m}"))
                        .unwrap();
                }
            }
        }
    }

    group.bench_function("layered_dag_200_nodes", |b| {
        b.iter(|| black_box(transitive_reduction(black_box(graph.clone())).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_module_extraction,
    benchmark_theorem_scanner,
    benchmark_transitive_reduction
);
criterion_main!(benches);
