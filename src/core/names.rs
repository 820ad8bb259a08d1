//! Short, unique display labels for long module paths.
//!
//! A module path like `/src/HolBA/src/theory/bir/birScript` is far too long for
//! a box in a diagram. Most of the time the file name alone (`birScript`) is
//! unique; when it is not, the labels of the colliding group grow from the
//! right, one directory at a time, until they differ.

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Extensions of HOL4 build artifacts.
pub const KNOWN_EXTENSIONS: [&str; 4] = [".sml", ".sig", ".ui", ".uo"];

const HOL4_SIGOBJ: &str = "$(HOLDIR)/sigobj/";
const HOL4_PREFIX: &str = "HOL4/";
const HOLBA_MARKER: &str = "/HolBA/";

/// Deepest suffix tried when resolving a collision (exclusive bound).
const MAX_SUFFIX_DEPTH: usize = 20;

/// Strip known artifact extensions from the end of `path`.
pub fn strip_extension(path: &str) -> &str {
    let mut stripped = path;
    while let Some(rest) = KNOWN_EXTENSIONS
        .iter()
        .find_map(|ext| stripped.strip_suffix(ext))
    {
        stripped = rest;
    }
    stripped
}

/// Rewrite paths under a well-known root to their short canonical form.
pub fn prettify_long_name(long_name: &str) -> String {
    let mut pretty = long_name.to_string();

    if let Some(index) = pretty.find(HOL4_SIGOBJ) {
        pretty = format!("{HOL4_PREFIX}{}", &pretty[index + HOL4_SIGOBJ.len()..]);
    }
    if let Some(index) = pretty.find(HOLBA_MARKER) {
        pretty = pretty[index + 1..].to_string();
    }

    pretty
}

fn prettify_path(path: &str) -> String {
    prettify_long_name(strip_extension(path))
}

/// Last `/` segment of `path`, without extension.
pub fn file_name(path: &str) -> &str {
    let stripped = strip_extension(path);
    stripped.rsplit('/').next().unwrap_or(stripped)
}

fn last_segments(path: &str, depth: usize) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let start = segments.len().saturating_sub(depth);
    segments[start..].join("/")
}

/// Map every long path to a short label, unique across `long_paths`.
///
/// HOL4 library paths keep their `HOL4/...` label, and a colliding group never
/// settles on one of those labels. The returned map iterates in the order of `long_paths`.
pub fn short_name_mapping<'a, I>(long_paths: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let paths: Vec<&str> = long_paths.into_iter().collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::with_capacity(paths.len());
    for path in &paths {
        *occurrences.entry(file_name(path)).or_default() += 1;
    }

    let mut mapping: IndexMap<String, String> = IndexMap::with_capacity(paths.len());
    let mut colliding: IndexMap<&str, Vec<(&str, String)>> = IndexMap::new();
    let mut hol4_labels: HashSet<String> = HashSet::new();

    for &path in &paths {
        let pretty = prettify_path(path);
        if pretty.starts_with(HOL4_PREFIX) {
            hol4_labels.insert(pretty.clone());
            mapping.insert(path.to_string(), pretty);
            continue;
        }

        let name = file_name(&pretty).to_string();
        if occurrences.get(file_name(path)).copied().unwrap_or(0) > 1 {
            colliding.entry(file_name(path)).or_default().push((path, pretty));
        } else {
            mapping.insert(path.to_string(), name);
        }
    }

    let mut resolutions: Vec<(&str, String)> = Vec::new();
    for group in colliding.values() {
        let labels_at = |depth: usize| -> Vec<String> {
            group
                .iter()
                .map(|(_, pretty)| last_segments(pretty, depth))
                .collect()
        };
        let depth = (2..MAX_SUFFIX_DEPTH)
            .find(|&depth| {
                let labels = labels_at(depth);
                let distinct: IndexSet<&str> = labels.iter().map(String::as_str).collect();
                distinct.len() == group.len()
                    && distinct.iter().all(|label| !hol4_labels.contains(*label))
            })
            .unwrap_or(MAX_SUFFIX_DEPTH - 1);

        for (&(path, _), label) in group.iter().zip(labels_at(depth)) {
            mapping.insert(path.to_string(), label.clone());
            resolutions.push((path, label));
        }
    }

    if !resolutions.is_empty() {
        let lines: Vec<String> = resolutions
            .iter()
            .map(|(path, label)| format!(" - {path} -> {label}"))
            .collect();
        info!("There are some non-unique module names:\n{}", lines.join("\n"));
    }

    // keep the caller's order even though collisions were resolved last
    paths
        .iter()
        .filter_map(|path| mapping.shift_remove_entry(*path))
        .collect()
}
