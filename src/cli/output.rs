//! CLI output formatting.

use std::fmt::Write;

use crate::config::ExperimentConfig;
use crate::error::McResult;
use crate::scheduler::SweepReport;

/// Print version information.
pub fn print_version() {
    println!(
        "mandelbrot-mc {} ({})",
        env!("MANDELBROT_MC_VERSION"),
        env!("MANDELBROT_MC_GIT_HASH")
    );
}

/// Print help message.
pub fn print_help() {
    println!(
        r"mandelbrot-mc - Monte Carlo area estimation of the Mandelbrot set

USAGE:
    mandelbrot-mc <COMMAND> [OPTIONS]

COMMANDS:
    run <experiment.yaml>       Run the parameter sweep of an experiment
        --seed <N>              Override the master seed
        --workers <N>           Override the worker count
        -v, --verbose           Enable debug logging
        --json                  Print the report (with summaries) as JSON

    validate <experiment.yaml>  Check an experiment file without running it

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    mandelbrot-mc run sweep.yaml
    mandelbrot-mc run sweep.yaml --seed 12345 --workers 8

LOGGING:
    Set RUST_LOG to control log output (default: info).
"
    );
}

/// Render the per-key summary table of a sweep.
#[must_use]
pub fn format_sweep_report(config: &ExperimentConfig, report: &SweepReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "sweep: {}  sampler: {}  seed: {}  workers: {}",
        report.kind, config.sampler, config.seed, report.workers
    );
    let _ = writeln!(
        out,
        "{:>12} {:>6} {:>10} {:>10} {:>23}",
        "value", "runs", "mean", "std", "95% CI"
    );

    let summaries = report.summaries();
    for key in report.results.keys() {
        match summaries.get(key) {
            Some(s) => {
                let _ = writeln!(
                    out,
                    "{key:>12} {:>6} {:>10.6} {:>10.6} [{:>10.6}, {:>10.6}]",
                    s.count, s.mean, s.std_dev, s.confidence_interval.0, s.confidence_interval.1
                );
            }
            None => {
                let _ = writeln!(out, "{key:>12} {:>6} {:>10}", 0, "-");
            }
        }
    }

    for (key, failures) in &report.failures {
        for failure in failures {
            let _ = writeln!(
                out,
                "failed: value {key} repeat {}: {}",
                failure.repeat, failure.message
            );
        }
    }

    let _ = writeln!(out, "tasks processed: {}", report.tasks_processed);
    out
}

/// Print the per-key summary table of a sweep.
pub fn print_sweep_report(config: &ExperimentConfig, report: &SweepReport) {
    print!("{}", format_sweep_report(config, report));
}

/// Render a sweep report and its per-key summaries as pretty JSON.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn format_sweep_json(report: &SweepReport) -> McResult<String> {
    let mut value = serde_json::Map::new();
    value.insert("report".to_string(), serde_json::to_value(report)?);
    value.insert("summaries".to_string(), serde_json::to_value(report.summaries())?);
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(value))?)
}
