//! Renderers for the final graph.
//!
//! Formatters only read the graph. Cluster members that are no longer in the
//! graph are skipped.

pub mod dot;
pub mod json;
pub mod raw;

pub use dot::DotFormatter;
pub use json::JsonFormatter;
pub use raw::RawFormatter;
