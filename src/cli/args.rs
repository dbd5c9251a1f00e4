//! CLI argument parsing.
//!
//! Hand-rolled parser over an argument iterator so every code path is
//! testable without touching the process environment.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate a configuration and report wind dataset coverage
    Inspect {
        /// Path to the experiment YAML file.
        config_path: PathBuf,
    },
    /// Run the wind sampler and report the draw plan
    Sample {
        /// Path to the experiment YAML file.
        config_path: PathBuf,
        /// Optional seed override.
        seed_override: Option<u64>,
    },
    /// Compute landing statistics from recorded run results
    Analyze {
        /// Path to a JSON file holding an array of run results.
        results_path: PathBuf,
        /// Confidence levels; empty means the 80/90/99 defaults.
        levels: Vec<f64>,
        /// Emit the summary as JSON instead of the text report.
        json: bool,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// Accepts any iterator of strings, not just `std::env::args()`.
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

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "inspect" => Self::parse_inspect_command(args),
            "sample" => Self::parse_sample_command(args),
            "analyze" => Self::parse_analyze_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the 'inspect' command arguments.
    fn parse_inspect_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'inspect' command requires a configuration path");
            return Command::Help;
        }

        Command::Inspect {
            config_path: PathBuf::from(&args[2]),
        }
    }

    /// Parse the 'sample' command arguments.
    fn parse_sample_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'sample' command requires a configuration path");
            return Command::Help;
        }

        let mut seed_override = None;

        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    if i + 1 < args.len() {
                        if let Ok(seed) = args[i + 1].parse() {
                            seed_override = Some(seed);
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }

        Command::Sample {
            config_path: PathBuf::from(&args[2]),
            seed_override,
        }
    }

    /// Parse the 'analyze' command arguments.
    fn parse_analyze_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'analyze' command requires a results path");
            return Command::Help;
        }

        let mut levels = Vec::new();
        let mut json = false;

        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--level" => {
                    if i + 1 < args.len() {
                        if let Ok(level) = args[i + 1].parse() {
                            levels.push(level);
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "--json" => {
                    json = true;
                    i += 1;
                }
                _ => i += 1,
            }
        }

        Command::Analyze {
            results_path: PathBuf::from(&args[2]),
            levels,
            json,
        }
    }
}
