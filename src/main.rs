use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use log::error;
use sugars::boxed;

use cloudlet_simulator::error::Result;
use cloudlet_simulator::simulation::CloudletSimulation;
use cloudlet_simulator::simulation_config::SimulationConfig;
use cloudlet_simulator::simulation_metrics::{save_summary, EmptyMetricsLogger, FileMetricsLogger, MetricsLogger, StdoutMetricsLogger};
use cloudlet_simulator::task::Scope;

/// Batch-means simulation of a two-tier Cloudlet/Cloud system
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// YAML configuration file, defaults are used if omitted
    #[arg(short, long)]
    config: Option<String>,

    /// CSV file receiving every batch mean
    #[arg(short, long)]
    batches_output: Option<String>,

    /// JSON file receiving the run summary
    #[arg(short, long)]
    summary_output: Option<String>,

    /// Overrides the seed of the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Logs the System/Global batch means as they close
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> Result<()> {
    let mut sim_config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        sim_config.seed = seed;
    }

    let metrics_logger: Box<dyn MetricsLogger> = if args.batches_output.is_some() {
        boxed!(FileMetricsLogger::new())
    } else if args.verbose {
        boxed!(StdoutMetricsLogger {})
    } else {
        boxed!(EmptyMetricsLogger {})
    };
    let mut sim = CloudletSimulation::new(sim_config, metrics_logger)?;
    sim.run()?;

    if let Some(path) = &args.batches_output {
        sim.finish_simulation(path)?;
    }
    let summary = sim.summary();
    if let Some(path) = &args.summary_output {
        save_summary(&summary, path)?;
    }

    println!("{:<10} {:<8} {:<20} {:>14} {:>14} {:>8}", "scope", "class", "measure", "mean", "half-width", "batches");
    for record in summary.iter().filter(|r| r.scope == Scope::System) {
        println!("{:<10} {:<8} {:<20} {:>14.6} {:>14.6} {:>8}", record.scope.to_string(), record.class.to_string(),
                 record.measure.to_string(), record.mean, record.half_width, record.batches);
    }
    Ok(())
}

fn main() -> ExitCode {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
