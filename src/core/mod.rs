pub mod error;
pub mod graph;
pub mod names;
pub mod pipeline;
pub mod scanner;

pub use error::GraphError;
pub use graph::{Cluster, DependencyGraph, Node, NodeAttrs};
pub use pipeline::Pipeline;
pub use scanner::FileScanner;
