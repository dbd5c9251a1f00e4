//! dispersim CLI - Monte Carlo wind dispersion for rocket flights
//!
//! Command-line interface for inspecting experiments, previewing wind
//! sampling plans, and summarizing landing results.

use std::process::ExitCode;

use dispersim::cli::{run_cli, Args};

fn main() -> ExitCode {
    init_logging();
    run_cli(Args::parse())
}

/// Logs go to stderr so `analyze --json` stdout stays machine-readable.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dispersim=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
