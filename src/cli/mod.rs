//! Command-line interface for mandelbrot-mc.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{execute_experiment, run_cli};
pub use output::{
    format_sweep_json, format_sweep_report, print_help, print_sweep_report, print_version,
};
