//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use crate::config::ExperimentConfig;
use crate::error::McResult;
use crate::scheduler::SweepReport;

use super::output::{format_sweep_json, print_help, print_sweep_report, print_version};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            experiment_path,
            seed_override,
            workers_override,
            json,
            ..
        } => run_experiment(&experiment_path, seed_override, workers_override, json),
        Command::Validate { experiment_path } => validate_experiment(&experiment_path),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load an experiment, apply overrides and run its sweep.
///
/// # Errors
///
/// Returns configuration errors from loading and any sweep error.
pub fn execute_experiment(
    path: &Path,
    seed_override: Option<u64>,
    workers_override: Option<usize>,
) -> McResult<(ExperimentConfig, SweepReport)> {
    let mut config = ExperimentConfig::load(path)?;
    if let Some(seed) = seed_override {
        config.seed = seed;
    }
    if let Some(workers) = workers_override {
        config.workers = workers;
    }
    config.check()?;

    tracing::info!(path = %path.display(), seed = config.seed, "loaded experiment");

    let scheduler = config.scheduler()?;
    let classifier = config.classifier()?;
    let sampler = config.sampler();
    let report = scheduler.run_sweep(
        &config.to_request(),
        &config.fixed_config(),
        sampler.as_ref(),
        &classifier,
    )?;

    Ok((config, report))
}

/// Run an experiment from a YAML file and print its report.
///
/// Exits with 1 on error and 2 when some tasks failed under the isolate
/// policy.
#[must_use]
pub fn run_experiment(
    path: &Path,
    seed_override: Option<u64>,
    workers_override: Option<usize>,
    json: bool,
) -> ExitCode {
    match execute_experiment(path, seed_override, workers_override) {
        Ok((config, report)) => {
            if json {
                match format_sweep_json(&report) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_sweep_report(&config, &report);
            }
            if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Validate an experiment YAML file without running it.
#[must_use]
pub fn validate_experiment(path: &Path) -> ExitCode {
    match ExperimentConfig::load(path) {
        Ok(config) => {
            println!("✓ {} is valid", path.display());
            println!("  sweep:   {} over {:?}", config.sweep.kind, config.sweep.values);
            println!("  sampler: {}", config.sampler);
            println!("  workers: {}", config.workers);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}: {e}", path.display());
            ExitCode::from(1)
        }
    }
}
