//! # depgraph
//!
//! Dependency graphs of HOL4 developments.
//!
//! A run is a pipeline: one frontend extracts a graph (the module hierarchy
//! from Holmake `.uo` records, or the theorem hierarchy from theory signatures
//! and proof scripts), an ordered chain of middlewares transforms it, and a
//! formatter renders it.
//!
//! ## Output Formats
//!
//! - **Raw**: node count, then every node with its attributes and dependencies
//! - **Dot**: GraphViz document with colored edges and clusters
//! - **JSON**: nodes, positional edges and clusters

pub mod cli;
pub mod core;
pub mod formatters;
pub mod frontends;
pub mod middlewares;
