//! mandelbrot-mc CLI
//!
//! Runs Monte Carlo parameter sweeps described by experiment YAML files.

use std::process::ExitCode;

use mandelbrot_mc::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    run_cli(args)
}
