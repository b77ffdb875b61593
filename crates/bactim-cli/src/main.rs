//! Command-line runner for bacterial ecosystem simulations.

mod telemetry;

use anyhow::{Context, Result};
use bactim_core::SimulationConfig;
use bactim_world::Runner;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON simulation configuration; the built-in laboratory scenario if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of ticks to run
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.num_ticks = ticks;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    telemetry::init_telemetry(args.json_logs)?;
    info!(
        organisms = config.organisms.len(),
        operons = config.genome.len(),
        "Starting bactim"
    );

    let mut runner = Runner::new(config).context("failed to build ecosystem")?;
    let summary = runner.run()?;

    println!("Ran {} ticks{}", summary.ticks_run, if summary.extinct { " (extinct)" } else { "" });
    for record in &summary.populations {
        let status = if record.summary.is_extinct() {
            "extinct".to_string()
        } else if record.summary.is_dying() {
            format!("dying from {:?}", record.summary.dying_from)
        } else if !record.summary.limited_by.is_empty() {
            format!("limited by {:?}", record.summary.limited_by)
        } else {
            "growing".to_string()
        };
        println!("  {:<12} {:>14.4e} cells  {}", record.summary.name, record.summary.count, status);
    }

    Ok(())
}
