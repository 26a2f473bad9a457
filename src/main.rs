//! La Liga Pipeline - command line entry point
//!
//! Runs one stage, or all three in order, against a configured data layout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use laliga_pipeline::{run_all, PipelineConfig, Stage, StageReport};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "laliga_pipeline", about = "Ingest, clean and transform La Liga player statistics")]
struct Cli {
    /// TOML file overriding the default file locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for the default file layout.
    #[arg(long, global = true, conflicts_with = "config")]
    data_dir: Option<PathBuf>,

    /// Emit logs and stage reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Canonicalize the raw table.
    Ingest,
    /// Coerce types and filter the canonical table.
    Clean,
    /// Derive player metrics and team aggregates.
    Transform,
    /// Run ingest, clean and transform in order.
    Run,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    if let Some(path) = &cli.config {
        return PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    Ok(cli
        .data_dir
        .as_ref()
        .map(PipelineConfig::rooted_at)
        .unwrap_or_default())
}

fn print_reports(reports: &[StageReport], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(reports).context("serializing stage reports")?
        );
    } else {
        for report in reports {
            println!("{report}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);

    let config = load_config(&cli)?;
    tracing::debug!(?config, "resolved configuration");

    let reports = match cli.command {
        Command::Ingest => vec![Stage::Ingest.run(&config).context("ingest failed")?],
        Command::Clean => vec![Stage::Clean.run(&config).context("clean failed")?],
        Command::Transform => vec![Stage::Transform.run(&config).context("transform failed")?],
        Command::Run => run_all(&config).context("pipeline run failed")?,
    };

    print_reports(&reports, cli.json)
}
