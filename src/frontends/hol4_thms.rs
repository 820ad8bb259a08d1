//! Theorem hierarchy from HOL4 theory signatures and proof scripts.
//!
//! Theorem names are collected from `xxxTheory.sig` files (`val foo : thm`)
//! and from `xxxScript.sml` files (`val foo = store_thm ...`, `prove`,
//! `Define`). Dependencies are found by a line scanner over the scripts: every
//! known theorem name that appears after a definition line, and before the
//! next one, is a dependency of that definition.
//!
//! The scanner has no idea where a proof really ends. Whatever sits between
//! the last definition of a file and the end of the file is attributed to that
//! last definition.

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{info, warn};

use super::common::{path_string, read_source};
use super::FrontEnd;
use crate::core::{DependencyGraph, FileScanner, GraphError, NodeAttrs};

pub const SIGNATURE_SUFFIX: &str = "Theory.sig";
pub const SCRIPT_SUFFIX: &str = "Script.sml";
const BUILD_LOGS: &str = ".hollogs";

const COMMENT_PATTERN: &str = r"(?s)\(\*.*?\*\)";
const SIGNATURE_PATTERN: &str = r"val +([^ ]+) *: *thm";
const DEFINITION_PATTERN: &str = r"val\s+([^ ]+)\s*=\s*(?:store_thm|prove|Define)";

/// Characters separating words when looking for theorem references.
const DELIMITERS: [char; 18] = [
    ',', ';', '\\', '[', ']', '(', ')', '+', '-', '*', '/', '<', '>', '!', '?', '`', ':', '.',
];

/// Identity of a theorem: its name without the `_def`/`_DEF` suffix, so that a
/// definition and the theorem generated for it are one node.
pub fn theorem_id(name: &str) -> &str {
    name.strip_suffix("_def")
        .or_else(|| name.strip_suffix("_DEF"))
        .unwrap_or(name)
}

/// The anonymous binding `val _ = ...`.
pub const ANONYMOUS: &str = "_";

/// Scratch names used for local lemmas, never worth a node.
pub fn is_placeholder_name(id: &str) -> bool {
    let numbered = |prefix: &str| {
        id.strip_prefix(prefix).is_some_and(|rest| {
            let digits = rest.strip_prefix('_').unwrap_or(rest);
            digits
                .parse::<u8>()
                .is_ok_and(|n| n < 20 && digits == n.to_string())
        })
    };
    id == "thm" || id == "lemma" || numbered("thm") || numbered("lemma")
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || DELIMITERS.contains(&c)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theorem {
    pub id: String,
    pub file_path: String,
    pub full_name: String,
}

impl Theorem {
    /// `<file path without its Theory.sig/Script.sml suffix>::<name>`
    pub fn long_name(&self) -> String {
        let stem = self
            .file_path
            .strip_suffix(SIGNATURE_SUFFIX)
            .or_else(|| self.file_path.strip_suffix(SCRIPT_SUFFIX))
            .unwrap_or(&self.file_path);
        format!("{stem}::{}", self.full_name)
    }
}

/// The regexes shared by discovery and dependency scanning.
#[derive(Debug, Clone)]
pub struct TheoremScanner {
    comment: Regex,
    signature: Regex,
    definition: Regex,
}

impl TheoremScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            comment: Regex::new(COMMENT_PATTERN)?,
            signature: Regex::new(SIGNATURE_PATTERN)?,
            definition: Regex::new(DEFINITION_PATTERN)?,
        })
    }

    /// Drop every `(* ... *)` region, including multi-line ones.
    pub fn strip_comments(&self, text: &str) -> String {
        self.comment.replace_all(text, "").into_owned()
    }

    /// Theorems declared in a signature. `text` must be comment-free.
    pub fn signature_theorems(&self, file_path: &str, text: &str) -> Vec<Theorem> {
        Self::theorems_matching(&self.signature, file_path, text)
    }

    /// Theorems defined or proved in a script. `text` must be comment-free.
    pub fn script_theorems(&self, file_path: &str, text: &str) -> Vec<Theorem> {
        Self::theorems_matching(&self.definition, file_path, text)
    }

    fn theorems_matching(regex: &Regex, file_path: &str, text: &str) -> Vec<Theorem> {
        text.lines()
            .filter_map(|line| regex.captures(line))
            .map(|captures| {
                let full_name = captures[1].to_string();
                Theorem {
                    id: theorem_id(&full_name).to_string(),
                    file_path: file_path.to_string(),
                    full_name,
                }
            })
            .collect()
    }

    /// Scan a comment-free script for references between `known` theorems.
    ///
    /// The current definition changes only on a definition line: one naming a
    /// known theorem starts its context, one naming `_` closes the context.
    /// Each line is then split into words while a context is open and every
    /// known theorem among them, other than the context itself, becomes a
    /// dependency of the context. The definition line itself is scanned too.
    pub fn dependencies(
        &self,
        text: &str,
        known: &HashSet<String>,
    ) -> IndexMap<String, IndexSet<String>> {
        let mut dependencies: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            if let Some(captures) = self.definition.captures(line) {
                let candidate = theorem_id(&captures[1]);
                if candidate == ANONYMOUS {
                    current = None;
                } else if known.contains(candidate) {
                    current = Some(candidate.to_string());
                }
            }

            let Some(context) = current.as_deref() else {
                continue;
            };
            for word in line.split(is_delimiter) {
                let id = theorem_id(word);
                if id != context && known.contains(id) {
                    dependencies
                        .entry(context.to_string())
                        .or_default()
                        .insert(id.to_string());
                }
            }
        }

        dependencies
    }
}

struct SourceFile {
    path: String,
    text: String,
}

pub struct Hol4ThmsFrontEnd {
    src_root: PathBuf,
    thm_root: String,
    scanner: TheoremScanner,
}

impl Hol4ThmsFrontEnd {
    /// Theorems come from everything under `src_root`; only those whose file
    /// path contains `thm_root` become nodes up front.
    pub fn new(src_root: PathBuf, thm_root: String) -> Result<Self> {
        Ok(Self {
            src_root,
            thm_root,
            scanner: TheoremScanner::new()?,
        })
    }

    fn read_sources(&self, suffix: &str) -> Result<Vec<SourceFile>> {
        let files = FileScanner::new()
            .excluding(BUILD_LOGS)
            .scan_directory(&self.src_root, &[suffix])?;

        files
            .par_iter()
            .map(|file| -> Result<SourceFile, GraphError> {
                let text = read_source(file)?;
                Ok(SourceFile {
                    path: path_string(file),
                    text: self.scanner.strip_comments(&text),
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()
            .with_context(|| format!("cannot read the {suffix} files"))
    }
}

impl FrontEnd for Hol4ThmsFrontEnd {
    fn dependency_graph(&self) -> Result<DependencyGraph> {
        info!(
            "Generating theorem hierarchy graph in {} of {}...",
            self.thm_root,
            self.src_root.display()
        );

        let signatures = self.read_sources(SIGNATURE_SUFFIX)?;
        let scripts = self.read_sources(SCRIPT_SUFFIX)?;
        info!(
            "Found {} theory signatures and {} scripts",
            signatures.len(),
            scripts.len()
        );

        let theorems = collect_theorems(&self.scanner, &signatures, &scripts);
        let known: HashSet<String> = theorems.keys().cloned().collect();

        let per_script: Vec<IndexMap<String, IndexSet<String>>> = scripts
            .par_iter()
            .map(|script| self.scanner.dependencies(&script.text, &known))
            .collect();
        let mut dependencies: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for script_dependencies in per_script {
            for (theorem, deps) in script_dependencies {
                dependencies.entry(theorem).or_default().extend(deps);
            }
        }

        let graph = build_theorem_graph(&theorems, &dependencies, &self.thm_root)?;
        info!(
            "Done: {} theorems, {} dependencies",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn frontend_name(&self) -> String {
        format!(
            "HOL4 theorem hierarchy in {} of {}",
            self.src_root.display(),
            self.thm_root
        )
    }
}

/// Signature theorems first, then script theorems without placeholders; the
/// first theorem seen for an identity wins. `_` is never a theorem.
fn collect_theorems(
    scanner: &TheoremScanner,
    signatures: &[SourceFile],
    scripts: &[SourceFile],
) -> IndexMap<String, Theorem> {
    let mut theorems: IndexMap<String, Theorem> = IndexMap::new();
    for signature in signatures {
        for theorem in scanner.signature_theorems(&signature.path, &signature.text) {
            if theorem.id == ANONYMOUS {
                continue;
            }
            theorems.entry(theorem.id.clone()).or_insert(theorem);
        }
    }
    for script in scripts {
        for theorem in scanner.script_theorems(&script.path, &script.text) {
            if theorem.id == ANONYMOUS || is_placeholder_name(&theorem.id) {
                continue;
            }
            theorems.entry(theorem.id.clone()).or_insert(theorem);
        }
    }
    theorems
}

/// Assemble the theorem graph.
///
/// Theorems outside `thm_root` only become nodes once an edge touches them.
/// Edges naming an undeclared theorem are kept, with a warning, and the
/// missing endpoint is added without attributes.
pub fn build_theorem_graph(
    theorems: &IndexMap<String, Theorem>,
    dependencies: &IndexMap<String, IndexSet<String>>,
    thm_root: &str,
) -> Result<DependencyGraph, GraphError> {
    let mut graph = DependencyGraph::new();
    let mut skipped: HashMap<&str, NodeAttrs> = HashMap::new();

    for theorem in theorems.values() {
        let attrs = NodeAttrs::new(theorem.long_name(), theorem.id.clone());
        if theorem.file_path.contains(thm_root) {
            graph.add_node(theorem.id.clone(), attrs);
        } else {
            skipped.insert(&theorem.id, attrs);
        }
    }

    let mut ensure_node = |graph: &mut DependencyGraph, id: &str| {
        if !graph.has_node(id) {
            let attrs = skipped.remove(id).unwrap_or_default();
            graph.add_node(id, attrs);
        }
    };

    for (theorem, deps) in dependencies {
        if !theorems.contains_key(theorem) {
            warn!("Dependencies of undeclared theorem: {theorem}");
        }
        for dependency in deps {
            if theorem == dependency {
                continue;
            }
            if !theorems.contains_key(dependency) {
                warn!("Dependency on undeclared theorem: {theorem} -> {dependency}");
            }
            ensure_node(&mut graph, theorem.as_str());
            ensure_node(&mut graph, dependency.as_str());
            graph.add_edge(theorem, dependency)?;
        }
    }

    Ok(graph)
}
