//! route-analyzer CLI - Analyse one recorded GPS trajectory
//!
//! Usage:
//!   route-analyzer <waypoints.csv> <parameters.yml> [--output <file>] [--basic] [--parallel] [-v]
//!
//! Reads `timestamp;latitude;longitude` records and the analysis parameters,
//! runs every analysis and writes the JSON report to stdout or `--output`.
//! Failed analyses are listed under `failures` in the report.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use route_analyzer::{io as report_io, RouteAnalyzer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "route-analyzer")]
#[command(about = "Metrics for a recorded GPS trajectory", long_about = None)]
struct Cli {
    /// Waypoint file (timestamp;latitude;longitude per line)
    waypoints: PathBuf,

    /// Parameters file (YAML, or TOML with a .toml extension)
    parameters: PathBuf,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the advanced sections (percentages, path length, intersections)
    #[arg(long)]
    basic: bool,

    /// Run the analyses concurrently (requires the `parallel` feature)
    #[arg(long)]
    parallel: bool,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let config = report_io::load_config(&cli.parameters)
        .with_context(|| format!("loading parameters from {}", cli.parameters.display()))?;
    let waypoints = report_io::read_waypoints(&cli.waypoints)
        .with_context(|| format!("loading waypoints from {}", cli.waypoints.display()))?;
    info!("Loaded {} waypoints", waypoints.len());

    let analyzer = RouteAnalyzer::new(config).with_advanced(!cli.basic);
    let report = run(&analyzer, &waypoints, cli.parallel);

    for failure in &report.failures {
        warn!("{:?}: {}", failure.analysis, failure.error);
    }

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating report {}", path.display()))?;
            report_io::write_report(BufWriter::new(file), &report)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => {
            report_io::write_report(io::stdout().lock(), &report).context("writing report")?;
        }
    }

    Ok(())
}

#[cfg(feature = "parallel")]
fn run(
    analyzer: &RouteAnalyzer,
    waypoints: &[route_analyzer::Waypoint],
    parallel: bool,
) -> route_analyzer::DataReport {
    if parallel {
        analyzer.analyze_parallel(waypoints)
    } else {
        analyzer.analyze(waypoints)
    }
}

#[cfg(not(feature = "parallel"))]
fn run(
    analyzer: &RouteAnalyzer,
    waypoints: &[route_analyzer::Waypoint],
    parallel: bool,
) -> route_analyzer::DataReport {
    if parallel {
        warn!("Built without the `parallel` feature, running sequentially");
    }
    analyzer.analyze(waypoints)
}
