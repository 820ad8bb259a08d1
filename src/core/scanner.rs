use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds the build artifacts an extractor reads.
///
/// A file is selected when its name ends with one of the requested suffixes,
/// its absolute path contains none of the excluded fragments and, if a path
/// filter is set, the filter matches somewhere in its absolute path.
#[derive(Debug, Clone, Default)]
pub struct FileScanner {
    path_filter: Option<Regex>,
    excluded_fragments: Vec<String>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_filter(mut self, filter: Option<Regex>) -> Self {
        self.path_filter = filter;
        self
    }

    pub fn excluding(mut self, fragment: impl Into<String>) -> Self {
        self.excluded_fragments.push(fragment.into());
        self
    }

    /// Absolute paths of the matching files under `root_path`.
    ///
    /// Files are grouped by directory, directories ordered by their path as a
    /// string, and files ordered by name within a directory.
    pub fn scan_directory(&self, root_path: &Path, suffixes: &[&str]) -> Result<Vec<PathBuf>> {
        let root = root_path
            .canonicalize()
            .with_context(|| format!("cannot resolve {}", root_path.display()))?;

        let entries: Vec<_> = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let mut files: Vec<PathBuf> = entries
            .par_iter()
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                suffixes.iter().any(|suffix| name.ends_with(suffix))
            })
            .filter(|entry| self.accepts(entry.path()))
            .map(|entry| entry.path().to_path_buf())
            .collect();

        files.sort_by_cached_key(|path| walk_order_key(path));
        Ok(files)
    }

    fn accepts(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        if self
            .excluded_fragments
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
        {
            return false;
        }
        self.path_filter
            .as_ref()
            .map_or(true, |filter| filter.is_match(&path))
    }
}

fn walk_order_key(path: &Path) -> (String, String) {
    let directory = path
        .parent()
        .map(|parent| parent.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (directory, name)
}
