//! CLI command handlers.
//!
//! Each handler loads what it needs through the library API, prints a
//! report, and maps errors onto exit codes.

use std::path::Path;
use std::process::ExitCode;

use crate::config::DispersionConfig;
use crate::error::DispersionResult;
use crate::flight::RunResult;
use crate::rng::DispersionRng;
use crate::stats::LandingStatistics;
use crate::wind::{WindDatabase, WindSampler};

use super::output::{
    print_help, print_inspect_report, print_sample_report, print_summary_report, print_version,
};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Inspect { config_path } => inspect(&config_path),
        Command::Sample {
            config_path,
            seed_override,
        } => sample(&config_path, seed_override),
        Command::Analyze {
            results_path,
            levels,
            json,
        } => analyze(&results_path, &levels, json),
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

/// Validate a configuration and report dataset coverage.
#[must_use]
pub fn inspect(path: &Path) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║           dispersim - Configuration Inspection                ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    println!("Inspecting: {}\n", path.display());

    match try_inspect(path) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn try_inspect(path: &Path) -> DispersionResult<ExitCode> {
    let config = DispersionConfig::load(path)?;
    let database = WindDatabase::load(&config.wind.dataset, &config.wind.period)?;
    let request = config.request()?;
    let observed = database.observed_days(&request.date_range).len();

    print_inspect_report(&config, &database, observed);

    // An unsampleable window is a failure exit even though inspection
    // itself succeeded
    Ok(if observed > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Run the wind sampler and report the draw plan.
#[must_use]
pub fn sample(path: &Path, seed_override: Option<u64>) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║           dispersim - Wind Sampling Plan                      ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    println!("Sampling winds for: {}\n", path.display());

    match try_sample(path, seed_override) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn try_sample(path: &Path, seed_override: Option<u64>) -> DispersionResult<ExitCode> {
    let config = DispersionConfig::load(path)?;
    let database = WindDatabase::load(&config.wind.dataset, &config.wind.period)?;
    let request = config.request()?;

    let seed = seed_override.unwrap_or(config.sampling.seed);
    let mut rng = DispersionRng::new(seed);
    let sampler = WindSampler::new(&database, config.wind.default_deviation);
    let profiles = sampler.sample_request(&request, &mut rng)?;
    let observed = database.observed_days(&request.date_range).len();

    print_sample_report(&request, seed, observed, profiles.len());
    Ok(ExitCode::SUCCESS)
}

/// Compute landing statistics from a recorded results file.
#[must_use]
pub fn analyze(path: &Path, levels: &[f64], json: bool) -> ExitCode {
    if !json {
        println!("╔═══════════════════════════════════════════════════════════════╗");
        println!("║           dispersim - Landing Statistics                      ║");
        println!("╚═══════════════════════════════════════════════════════════════╝\n");

        println!("Analyzing: {}\n", path.display());
    }

    match try_analyze(path, levels, json) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn try_analyze(path: &Path, levels: &[f64], json: bool) -> DispersionResult<ExitCode> {
    let content = std::fs::read_to_string(path)?;
    let results: Vec<RunResult> = serde_json::from_str(&content)?;

    let mut stats = if levels.is_empty() {
        LandingStatistics::with_default_levels()
    } else {
        LandingStatistics::new(levels)?
    };
    stats.add_all(&results);
    let summary = stats.summary()?;

    if json {
        // Keep stdout pure JSON so the output can be piped
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary_report(&summary);
    }
    Ok(ExitCode::SUCCESS)
}
