//! Command-line surface.
//!
//! Middleware flags may be repeated and are applied in the order they appear
//! on the command line, so the pipeline is assembled from the raw arguments
//! and not from the parsed struct alone.

use anyhow::{anyhow, bail, Result};
use clap::{
    ArgAction, ArgGroup, ArgMatches, Args, Command, CommandFactory, FromArgMatches, Parser,
    ValueEnum,
};
use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::warn;

use crate::core::Pipeline;
use crate::formatters::dot::DEFAULT_SEED;
use crate::frontends::FrontEndKind;
use crate::middlewares::MiddlewareKind;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "depgraph",
    version,
    about = "Dependency graph generator for HOL4 module and theorem hierarchies"
)]
#[command(group(ArgGroup::new("frontend").required(true).args(["hol4", "hol4_thms"])))]
#[command(group(ArgGroup::new("backend").args(["as_raw_graph", "as_dot", "as_json", "no_backend"])))]
pub struct Cli {
    /// Output file (stdout when absent)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Logging level, overridden by DEPGRAPH_LOG
    #[arg(long = "log", value_name = "LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Seed of the edge and cluster colors
    #[arg(long, value_name = "SEED", default_value_t = DEFAULT_SEED)]
    pub random_seed: u64,

    /// Only read the dependency records whose path matches REGEX (--hol4)
    #[arg(long, value_name = "REGEX")]
    pub filter_files: Option<String>,

    /// Drop the dependencies whose name matches REGEX (--hol4)
    #[arg(long, value_name = "REGEX")]
    pub exclude_dependencies: Option<String>,

    /// Keep the dependencies whose name matches REGEX, even when excluded (--hol4)
    #[arg(long, value_name = "REGEX")]
    pub keep_dependencies: Option<String>,

    /// Module hierarchy of the Holmake build under SRC-ROOT
    #[arg(long, value_name = "SRC-ROOT")]
    pub hol4: Option<PathBuf>,

    /// Theorem hierarchy of the theories under THM-ROOT, resolved within SRC-ROOT
    #[arg(long, num_args = 2, value_names = ["SRC-ROOT", "THM-ROOT"])]
    pub hol4_thms: Option<Vec<String>>,

    #[command(flatten)]
    pub middlewares: MiddlewareArgs,

    /// Plain node and dependency listing (default)
    #[arg(long)]
    pub as_raw_graph: bool,

    /// GraphViz document
    #[arg(long)]
    pub as_dot: bool,

    /// JSON document
    #[arg(long)]
    pub as_json: bool,

    /// Run the pipeline without rendering anything
    #[arg(long)]
    pub no_backend: bool,

    /// Left-to-right layout for --as-dot
    #[arg(long)]
    pub dot_horizontal: bool,
}

/// Graph transformations, applied in command-line order.
#[derive(Debug, Clone, Default, Args)]
#[command(next_help_heading = "Middlewares (applied in command-line order)")]
pub struct MiddlewareArgs {
    /// Color NODE and every node depending on it
    #[arg(long, num_args = 2, value_names = ["NODE", "COLOR"], action = ArgAction::Append, visible_alias = "highlight-dependents-of")]
    pub highlight_ancestors_of: Vec<String>,

    /// Color NODE and every node it depends on
    #[arg(long, num_args = 2, value_names = ["NODE", "COLOR"], action = ArgAction::Append, visible_alias = "highlight-dependencies-of")]
    pub highlight_descendants_of: Vec<String>,

    /// Color the nodes nothing depends on
    #[arg(long, value_name = "COLOR", action = ArgAction::Append, visible_alias = "highlight-parents")]
    pub highlight_roots: Vec<String>,

    /// Color the nodes depending on nothing
    #[arg(long, value_name = "COLOR", action = ArgAction::Append, visible_alias = "highlight-children")]
    pub highlight_leaves: Vec<String>,

    /// Only keep the nodes depending on NODE
    #[arg(long, value_name = "NODE", action = ArgAction::Append, visible_alias = "keep-only-dependents-of")]
    pub keep_only_ancestors_of: Vec<String>,

    /// Only keep the nodes NODE depends on
    #[arg(long, value_name = "NODE", action = ArgAction::Append, visible_alias = "keep-only-dependencies-of")]
    pub keep_only_descendants_of: Vec<String>,

    /// Remove every node depending on NODE
    #[arg(long, value_name = "NODE", action = ArgAction::Append, visible_alias = "remove-dependents-of")]
    pub remove_ancestors_of: Vec<String>,

    /// Remove every node NODE depends on
    #[arg(long, value_name = "NODE", action = ArgAction::Append, visible_alias = "remove-dependencies-of")]
    pub remove_descendants_of: Vec<String>,

    /// Remove the roots, except the KEEP nodes
    #[arg(long, num_args = 0.., value_name = "KEEP", action = ArgAction::Append, visible_alias = "remove-parents")]
    pub remove_roots: Option<Vec<String>>,

    /// Remove the leaves, except the KEEP nodes
    #[arg(long, num_args = 0.., value_name = "KEEP", action = ArgAction::Append, visible_alias = "remove-children")]
    pub remove_leaves: Option<Vec<String>>,

    /// One cluster per REGEX, matched against the long names
    #[arg(long, num_args = 1.., value_name = "REGEX", action = ArgAction::Append)]
    pub regex_cluster: Vec<String>,

    /// One cluster of the node ids matching any REGEX
    #[arg(long, num_args = 1.., value_name = "REGEX", action = ArgAction::Append)]
    pub cluster_regex: Vec<String>,

    /// Drop the edges implied by longer paths
    #[arg(long, action = ArgAction::Count)]
    pub transitive_reduction: u8,

    /// Collapse every cluster into a single node
    #[arg(long, action = ArgAction::Count)]
    pub condense_inter_clusters_edges: u8,
}

/// Argument ids of the middleware flags; the flag-only ones carry no value.
const MIDDLEWARE_ARGS: [(&str, bool); 14] = [
    ("highlight_ancestors_of", true),
    ("highlight_descendants_of", true),
    ("highlight_roots", true),
    ("highlight_leaves", true),
    ("keep_only_ancestors_of", true),
    ("keep_only_descendants_of", true),
    ("remove_ancestors_of", true),
    ("remove_descendants_of", true),
    ("remove_roots", true),
    ("remove_leaves", true),
    ("regex_cluster", true),
    ("cluster_regex", true),
    ("transitive_reduction", false),
    ("condense_inter_clusters_edges", false),
];

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    #[value(alias = "critical")]
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputFormat {
    Raw,
    Dot,
    Json,
    Nothing,
}

impl Cli {
    /// Parse `args` (program name first) into the options and their pipeline.
    pub fn try_parse_pipeline<I, T>(args: I) -> Result<(Cli, Pipeline)>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let matches = Cli::command().try_get_matches_from(&args)?;
        Cli::from_matches(&matches, &args)
    }

    /// Same as [`Cli::try_parse_pipeline`], from matches obtained by the caller
    /// on the same `args`.
    pub fn from_matches(matches: &ArgMatches, args: &[OsString]) -> Result<(Cli, Pipeline)> {
        let cli = Cli::from_arg_matches(matches)?;
        let mut pipeline = Pipeline::new(cli.frontend()?);
        for middleware in ordered_middlewares(&Cli::command(), matches, args)? {
            pipeline = pipeline.with_middleware(middleware);
        }
        Ok((cli, pipeline))
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.as_dot {
            OutputFormat::Dot
        } else if self.as_json {
            OutputFormat::Json
        } else if self.no_backend {
            OutputFormat::Nothing
        } else {
            OutputFormat::Raw
        }
    }

    fn frontend(&self) -> Result<FrontEndKind> {
        if let Some(src_root) = &self.hol4 {
            return Ok(FrontEndKind::Hol4 {
                src_root: src_root.clone(),
                filter_files: self.filter_files.clone(),
                exclude_dependencies: self.exclude_dependencies.clone(),
                keep_dependencies: self.keep_dependencies.clone(),
            });
        }

        match self.hol4_thms.as_deref() {
            Some([src_root, thm_root]) => {
                if self.filter_files.is_some()
                    || self.exclude_dependencies.is_some()
                    || self.keep_dependencies.is_some()
                {
                    warn!("Dependency filters only apply to --hol4, ignoring them");
                }
                Ok(FrontEndKind::Hol4Thms {
                    src_root: PathBuf::from(src_root),
                    thm_root: thm_root.clone(),
                })
            }
            _ => bail!("exactly one of --hol4 and --hol4-thms is required"),
        }
    }
}

/// Middlewares in the order their flags appear in `args`.
///
/// The k-th appearance of a flag, under its name or any alias, is paired with
/// the k-th group of values clap recorded for it.
fn ordered_middlewares(
    command: &Command,
    matches: &ArgMatches,
    args: &[OsString],
) -> Result<Vec<MiddlewareKind>> {
    let mut flag_ids: HashMap<String, &'static str> = HashMap::new();
    for arg in command.get_arguments() {
        let Some(&(id, _)) = MIDDLEWARE_ARGS
            .iter()
            .find(|(id, _)| *id == arg.get_id().as_str())
        else {
            continue;
        };
        if let Some(long) = arg.get_long() {
            flag_ids.insert(long.to_string(), id);
        }
        for alias in arg.get_all_aliases().into_iter().flatten() {
            flag_ids.insert(alias.to_string(), id);
        }
    }

    let mut occurrences: HashMap<&str, VecDeque<Vec<String>>> = HashMap::new();
    for (id, takes_values) in MIDDLEWARE_ARGS {
        if !takes_values {
            continue;
        }
        let groups = matches
            .try_get_occurrences::<String>(id)?
            .map(|groups| groups.map(|group| group.cloned().collect()).collect())
            .unwrap_or_default();
        occurrences.insert(id, groups);
    }

    let mut middlewares = Vec::new();
    for arg in args.iter().skip(1) {
        let arg = arg.to_string_lossy();
        if arg == "--" {
            break;
        }
        let Some(flag) = arg.strip_prefix("--") else {
            continue;
        };
        let flag = flag.split_once('=').map_or(flag, |(name, _)| name);
        let Some(&id) = flag_ids.get(flag) else {
            continue;
        };
        let values = occurrences
            .get_mut(id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();
        middlewares.push(middleware_kind(id, values)?);
    }

    Ok(middlewares)
}

fn middleware_kind(id: &str, values: Vec<String>) -> Result<MiddlewareKind> {
    let kind = match id {
        "highlight_ancestors_of" => {
            let [node, color] = exactly(id, values)?;
            MiddlewareKind::HighlightAncestorsOf { node, color }
        }
        "highlight_descendants_of" => {
            let [node, color] = exactly(id, values)?;
            MiddlewareKind::HighlightDescendantsOf { node, color }
        }
        "highlight_roots" => {
            let [color] = exactly(id, values)?;
            MiddlewareKind::HighlightRoots { color }
        }
        "highlight_leaves" => {
            let [color] = exactly(id, values)?;
            MiddlewareKind::HighlightLeaves { color }
        }
        "keep_only_ancestors_of" => {
            let [node] = exactly(id, values)?;
            MiddlewareKind::KeepOnlyAncestorsOf { node }
        }
        "keep_only_descendants_of" => {
            let [node] = exactly(id, values)?;
            MiddlewareKind::KeepOnlyDescendantsOf { node }
        }
        "remove_ancestors_of" => {
            let [node] = exactly(id, values)?;
            MiddlewareKind::RemoveAncestorsOf { node }
        }
        "remove_descendants_of" => {
            let [node] = exactly(id, values)?;
            MiddlewareKind::RemoveDescendantsOf { node }
        }
        "remove_roots" => MiddlewareKind::RemoveRoots { keep: values },
        "remove_leaves" => MiddlewareKind::RemoveLeaves { keep: values },
        "regex_cluster" => MiddlewareKind::RegexCluster { patterns: values },
        "cluster_regex" => MiddlewareKind::ClusterRegex { patterns: values },
        "transitive_reduction" => MiddlewareKind::TransitiveReduction,
        "condense_inter_clusters_edges" => MiddlewareKind::CondenseInterClustersEdges,
        other => bail!("unknown middleware argument {other}"),
    };
    Ok(kind)
}

fn exactly<const N: usize>(id: &str, values: Vec<String>) -> Result<[String; N]> {
    values.try_into().map_err(|values: Vec<String>| {
        anyhow!(
            "--{} expects {N} value(s), got {}",
            id.replace('_', "-"),
            values.len()
        )
    })
}
