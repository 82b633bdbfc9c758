//! `ukf-demo` CLI: run simulated scenarios through the filter and report
//! accuracy and consistency.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use sim::scenarios::{Scenario, ScenarioKind};
use sim::RunReport;
use ukf_core::metrics::RmseAccumulator;
use ukf_core::{Ukf, UkfConfig};

#[derive(Parser)]
#[command(name = "ukf-demo", about = "CTRV unscented Kalman filter demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario once and print metrics.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Ignore lidar measurements (predict only)
        #[arg(long)]
        no_lidar: bool,
        /// Ignore radar measurements (predict only)
        #[arg(long)]
        no_radar: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a scenario over many seeds in parallel and print the mean RMSE.
    MonteCarlo {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Number of seeds
        #[arg(long, default_value_t = 100)]
        runs: u64,
        /// First seed; runs use consecutive seeds
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            no_lidar,
            no_radar,
            json,
        } => {
            let config = UkfConfig {
                use_lidar: !no_lidar,
                use_radar: !no_radar,
                ..UkfConfig::default()
            };
            run_scenario(scenario, seed, config, json)?;
        }
        Commands::MonteCarlo {
            scenario,
            runs,
            seed,
        } => {
            run_monte_carlo(scenario, seed, runs)?;
        }
    }

    Ok(())
}

fn evaluate(kind: ScenarioKind, seed: u64, config: UkfConfig) -> Result<RunReport> {
    let scenario = Scenario::build(kind, seed);
    let recording = scenario
        .record()
        .with_context(|| format!("recording scenario '{}'", scenario.name))?;
    let mut ukf = Ukf::new(config)?;
    recording
        .evaluate(&mut ukf)
        .with_context(|| format!("filtering scenario '{}' (seed={seed})", scenario.name))
}

fn run_scenario(kind: ScenarioKind, seed: u64, config: UkfConfig, json: bool) -> Result<()> {
    let start = std::time::Instant::now();
    let report = evaluate(kind, seed, config)?;
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Scenario '{}' (seed={}): {} measurements, elapsed={:.3}s",
        report.scenario,
        report.seed,
        report.measurements,
        elapsed.as_secs_f64()
    );
    let [px, py, vx, vy] = report.rmse;
    println!("RMSE  px={px:.4}  py={py:.4}  vx={vx:.4}  vy={vy:.4}");
    let [x, y, v, yaw, yaw_rate] = report.final_state;
    println!("Final x=[{x:.3}, {y:.3}, {v:.3}, {yaw:.3}, {yaw_rate:.3}]");
    println!(
        "NIS > χ²₀.₉₅  lidar={:.1}%  radar={:.1}%",
        report.lidar_nis_exceedance * 100.0,
        report.radar_nis_exceedance * 100.0
    );

    Ok(())
}

fn run_monte_carlo(kind: ScenarioKind, first_seed: u64, runs: u64) -> Result<()> {
    let start = std::time::Instant::now();
    let results: Vec<Result<RunReport>> = (first_seed..first_seed + runs)
        .into_par_iter()
        .map(|seed| evaluate(kind, seed, UkfConfig::default()))
        .collect();

    let mut total = RmseAccumulator::new();
    let mut failed = 0usize;
    for result in results {
        match result {
            Ok(report) => total.merge(&report.errors),
            Err(e) => {
                failed += 1;
                tracing::warn!(error = %e, "run failed");
            }
        }
    }

    let [px, py, vx, vy] = total.rmse();
    println!(
        "Monte-Carlo {:?}: {} runs ({} failed), elapsed={:.2}s",
        kind,
        runs,
        failed,
        start.elapsed().as_secs_f64()
    );
    println!("Pooled RMSE  px={px:.4}  py={py:.4}  vx={vx:.4}  vy={vy:.4}");

    Ok(())
}
