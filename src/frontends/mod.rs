pub mod common;
pub mod hol4;
pub mod hol4_thms;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::compile_regex;
use crate::core::DependencyGraph;

/// Produces the initial graph of a pipeline.
pub trait FrontEnd {
    fn dependency_graph(&self) -> Result<DependencyGraph>;
    fn frontend_name(&self) -> String;
}

/// Frontend selection, as assembled by the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontEndKind {
    /// Module hierarchy from Holmake `.uo` dependency records.
    Hol4 {
        src_root: PathBuf,
        filter_files: Option<String>,
        exclude_dependencies: Option<String>,
        keep_dependencies: Option<String>,
    },
    /// Theorem hierarchy from `*Theory.sig` and `*Script.sml` files.
    Hol4Thms { src_root: PathBuf, thm_root: String },
}

impl FrontEndKind {
    pub fn build(&self) -> Result<Box<dyn FrontEnd>> {
        match self {
            FrontEndKind::Hol4 {
                src_root,
                filter_files,
                exclude_dependencies,
                keep_dependencies,
            } => {
                let filter = hol4::DependencyFilter::new(
                    exclude_dependencies.as_deref().map(compile_regex).transpose()?,
                    keep_dependencies.as_deref().map(compile_regex).transpose()?,
                );
                let path_filter = filter_files.as_deref().map(compile_regex).transpose()?;
                Ok(Box::new(
                    hol4::Hol4FrontEnd::new(src_root.clone())
                        .with_path_filter(path_filter)
                        .with_dependency_filter(filter),
                ))
            }
            FrontEndKind::Hol4Thms { src_root, thm_root } => Ok(Box::new(
                hol4_thms::Hol4ThmsFrontEnd::new(src_root.clone(), thm_root.clone())?,
            )),
        }
    }
}
