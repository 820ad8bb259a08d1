use anyhow::{Context, Result};
use clap::CommandFactory;
use std::ffi::OsString;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use depgraph::cli::{Cli, LogLevel, OutputFormat};
use depgraph::core::{DependencyGraph, Pipeline};
use depgraph::formatters::{DotFormatter, JsonFormatter, RawFormatter};

const LOG_ENV: &str = "DEPGRAPH_LOG";

fn main() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let matches = Cli::command().get_matches_from(&args);
    let (cli, pipeline) = Cli::from_matches(&matches, &args)?;
    init_tracing(cli.log_level);

    run(&cli, &pipeline).inspect_err(|err| error!("{err:#}"))
}

/// Logs go to stderr so that the rendered graph can be piped from stdout.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("depgraph={}", level.as_str())));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .try_init();
}

fn run(cli: &Cli, pipeline: &Pipeline) -> Result<()> {
    let start_time = Instant::now();
    let graph = pipeline.run()?;
    info!(
        "Pipeline completed in {:.2}s: {} nodes, {} edges, {} clusters",
        start_time.elapsed().as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        graph.clusters().len()
    );

    let rendered = match cli.output_format() {
        OutputFormat::Nothing => {
            info!("No backend, nothing rendered");
            return Ok(());
        }
        format => render(cli, format, &graph)?,
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("cannot write {}", path.display()))?;
            info!("Generated {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            match stdout.write_all(rendered.as_bytes()).and_then(|()| stdout.flush()) {
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
                result => result.context("cannot write to stdout")?,
            }
        }
    }

    Ok(())
}

fn render(cli: &Cli, format: OutputFormat, graph: &DependencyGraph) -> Result<String> {
    match format {
        OutputFormat::Raw => RawFormatter::new().format_graph(graph),
        OutputFormat::Dot => DotFormatter::new()
            .with_horizontal(cli.dot_horizontal)
            .with_seed(cli.random_seed)
            .format_graph(graph),
        OutputFormat::Json => JsonFormatter::new().format_graph(graph),
        OutputFormat::Nothing => Ok(String::new()),
    }
}
