//! CLI argument parsing.
//!
//! Hand-rolled parser for the mandelbrot-mc CLI. Accepts any iterator of
//! strings so parsing can be tested without a process environment.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a parameter sweep
    Run {
        /// Path to the experiment YAML file.
        experiment_path: PathBuf,
        /// Optional seed override.
        seed_override: Option<u64>,
        /// Optional worker count override.
        workers_override: Option<usize>,
        /// Enable debug logging.
        verbose: bool,
        /// Print the report as JSON instead of a table.
        json: bool,
    },
    /// Validate an experiment YAML file without running it
    Validate {
        /// Path to the experiment YAML file.
        experiment_path: PathBuf,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Whether debug logging was requested.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        matches!(self.command, Command::Run { verbose: true, .. })
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "validate" => Self::parse_validate_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_run_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'run' command requires experiment path");
            return Command::Help;
        }

        let mut seed_override = None;
        let mut workers_override = None;
        let mut verbose = false;
        let mut json = false;

        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    if let Some(value) = args.get(i + 1) {
                        match value.parse() {
                            Ok(seed) => seed_override = Some(seed),
                            Err(_) => eprintln!("Warning: ignoring invalid seed '{value}'"),
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "--workers" => {
                    if let Some(value) = args.get(i + 1) {
                        match value.parse() {
                            Ok(n) => workers_override = Some(n),
                            Err(_) => eprintln!("Warning: ignoring invalid worker count '{value}'"),
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "-v" | "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                "--json" => {
                    json = true;
                    i += 1;
                }
                _ => i += 1,
            }
        }

        Command::Run {
            experiment_path: PathBuf::from(&args[2]),
            seed_override,
            workers_override,
            verbose,
            json,
        }
    }

    fn parse_validate_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'validate' command requires experiment path");
            return Command::Help;
        }

        Command::Validate {
            experiment_path: PathBuf::from(&args[2]),
        }
    }
}
