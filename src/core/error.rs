use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the graph model, the extractors and the middlewares.
///
/// Every variant is fatal for a run: the CLI reports it and exits.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node id referenced by an edge or a single-target stage is absent.
    #[error("no node \"{0}\" in the graph")]
    MissingNode(String),

    /// A cycle was found where a DAG is required.
    #[error("the graph contains a cycle: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// A dependency record file could not be read as text.
    #[error("malformed dependency record {}: {reason}", .path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    /// A user-supplied regular expression does not compile.
    #[error("invalid regex /{pattern}/: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GraphError {
    pub fn missing(id: impl Into<String>) -> Self {
        Self::MissingNode(id.into())
    }
}

/// Compile `pattern`, mapping failures to [`GraphError::InvalidRegex`].
pub fn compile_regex(pattern: &str) -> Result<regex::Regex, GraphError> {
    regex::Regex::new(pattern).map_err(|source| GraphError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}
