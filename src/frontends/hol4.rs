//! Module hierarchy from Holmake dependency records.
//!
//! Holmake leaves one `.uo` file per compiled module; each line of it is the
//! path of a module the compiled one depends on.

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::common::{path_string, read_text};
use super::FrontEnd;
use crate::core::names::{short_name_mapping, strip_extension};
use crate::core::{DependencyGraph, FileScanner, GraphError, NodeAttrs};

pub const RECORD_SUFFIXES: [&str; 1] = [".uo"];

/// One parsed dependency record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub module: String,
    pub dependencies: Vec<String>,
}

/// Parse the record at `path`. The module id is the record path itself.
pub fn read_dependency_record(path: &Path) -> Result<ModuleRecord, GraphError> {
    let content = read_text(path).map_err(|source| match source.kind() {
        io::ErrorKind::InvalidData => GraphError::MalformedRecord {
            path: path.to_path_buf(),
            reason: source.to_string(),
        },
        _ => GraphError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(parse_dependency_record(&path_string(path), &content))
}

pub fn parse_dependency_record(record_path: &str, content: &str) -> ModuleRecord {
    let dependencies = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| strip_extension(line).to_string())
        .collect();

    ModuleRecord {
        module: strip_extension(record_path).to_string(),
        dependencies,
    }
}

/// Decides which dependency edges survive, by the dependency's short label.
///
/// With both regexes set, `keep` wins over `exclude`. A lone `keep` regex keeps
/// only the dependencies it matches.
#[derive(Debug, Clone, Default)]
pub struct DependencyFilter {
    exclude: Option<Regex>,
    keep: Option<Regex>,
}

impl DependencyFilter {
    pub fn new(exclude: Option<Regex>, keep: Option<Regex>) -> Self {
        Self { exclude, keep }
    }

    pub fn keeps(&self, dependency: &str) -> bool {
        match (&self.exclude, &self.keep) {
            (Some(exclude), Some(keep)) => {
                !exclude.is_match(dependency) || keep.is_match(dependency)
            }
            (Some(exclude), None) => !exclude.is_match(dependency),
            (None, Some(keep)) => keep.is_match(dependency),
            (None, None) => true,
        }
    }
}

pub struct Hol4FrontEnd {
    src_root: PathBuf,
    scanner: FileScanner,
    filter: DependencyFilter,
}

impl Hol4FrontEnd {
    pub fn new(src_root: PathBuf) -> Self {
        Self {
            src_root,
            scanner: FileScanner::new(),
            filter: DependencyFilter::default(),
        }
    }

    /// Only read the records whose absolute path matches `filter`.
    pub fn with_path_filter(mut self, filter: Option<Regex>) -> Self {
        self.scanner = self.scanner.with_path_filter(filter);
        self
    }

    pub fn with_dependency_filter(mut self, filter: DependencyFilter) -> Self {
        self.filter = filter;
        self
    }

    fn read_records(&self) -> Result<Vec<ModuleRecord>> {
        let files = self
            .scanner
            .scan_directory(&self.src_root, &RECORD_SUFFIXES)?;
        info!("Found {} dependency records", files.len());

        let records = files
            .par_iter()
            .map(|file| read_dependency_record(file))
            .collect::<Result<Vec<_>, _>>()
            .context("cannot read the Holmake dependency records")?;
        Ok(records)
    }
}

impl FrontEnd for Hol4FrontEnd {
    fn dependency_graph(&self) -> Result<DependencyGraph> {
        info!("Generating dependency graph in: {}", self.src_root.display());
        let records = self.read_records()?;
        let graph = build_module_graph(records, &self.filter)?;
        info!(
            "Done: {} modules, {} dependencies",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn frontend_name(&self) -> String {
        "HOL4 from .uo files".to_string()
    }
}

/// Merge `records` into a module graph whose node ids are the short labels.
pub fn build_module_graph(
    records: Vec<ModuleRecord>,
    filter: &DependencyFilter,
) -> Result<DependencyGraph, GraphError> {
    let mut deps_of_modules: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for record in records {
        deps_of_modules
            .entry(record.module)
            .or_default()
            .extend(record.dependencies);
    }
    for (module, dependencies) in deps_of_modules.iter_mut() {
        dependencies.shift_remove(module);
    }

    let mut all_modules: IndexSet<&str> = IndexSet::new();
    for (module, dependencies) in &deps_of_modules {
        all_modules.insert(module);
        all_modules.extend(dependencies.iter().map(String::as_str));
    }

    let short_names = short_name_mapping(all_modules.iter().copied());
    let short_name = |long: &str| -> String {
        short_names
            .get(long)
            .cloned()
            .unwrap_or_else(|| long.to_string())
    };

    let mut graph = DependencyGraph::new();
    for &module in &all_modules {
        let short = short_name(module);
        graph.add_node(short.clone(), NodeAttrs::new(module, short));
    }

    let mut filtered: IndexSet<String> = IndexSet::new();
    for (module, dependencies) in &deps_of_modules {
        let from = short_name(module.as_str());
        for dependency in dependencies {
            let to = short_name(dependency.as_str());
            if to == from {
                continue;
            }
            if filter.keeps(&to) {
                graph.add_edge(&from, &to)?;
            } else {
                debug!("Filtered dependency {from} -> {to}");
                filtered.insert(to);
            }
        }
    }

    for dependency in &filtered {
        if graph.in_degree(dependency) == 0 && graph.out_degree(dependency) == 0 {
            debug!("Removing dangling filtered module {dependency}");
            graph.remove_node(dependency);
        }
    }

    Ok(graph)
}
