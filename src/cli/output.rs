//! CLI output formatting.
//!
//! All report printing lives here so command handlers stay thin and the
//! formatting can be exercised directly in tests.

use crate::config::{DateRange, DispersionConfig, SimulationRequest};
use crate::stats::StatisticsSummary;
use crate::wind::{WindDatabase, WindSampler};

/// Print version information.
pub fn print_version() {
    println!("dispersim {}", env!("CARGO_PKG_VERSION"));
    if let Some(hash) = option_env!("GIT_HASH") {
        println!("commit: {hash}");
    }
    if let Some(timestamp) = option_env!("BUILD_TIMESTAMP") {
        println!("built: {timestamp}");
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"dispersim - Monte Carlo landing dispersion for rocket flights

USAGE:
    dispersim <COMMAND> [OPTIONS]

COMMANDS:
    inspect <config.yaml>       Validate a configuration and report wind
                                dataset coverage of the sampling window

    sample <config.yaml>        Run the wind sampler and report the plan
        --seed <N>              Override the configured seed

    analyze <results.json>      Compute landing statistics from recorded
                                run results (a JSON array)
        --level <P>             Add a confidence level in (0, 1); repeatable
        --json                  Emit the summary as JSON

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    dispersim inspect experiments/spring_launch.yaml
    dispersim sample experiments/spring_launch.yaml --seed 12345
    dispersim analyze results/spring_launch.json --level 0.95 --json

Flight execution requires a linked engine; drive it through the library
API (see the SimulationRunner and DispersionBatch types).
"
    );
}

/// Print the configuration / dataset coverage report.
///
/// `observed_days` is how many days of the sampling window carry an
/// observation.
pub fn print_inspect_report(
    config: &DispersionConfig,
    database: &WindDatabase,
    observed_days: usize,
) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Wind Dataset: {}", config.wind.dataset.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("  Period key:    {}", config.wind.period);
    println!("  Days indexed:  {}", database.len());
    if let (Some(first), Some(last)) = (database.dates().next(), database.dates().last()) {
        println!("  First record:  {first}");
        println!("  Last record:   {last}");
    }

    let range = DateRange::new(config.sampling.start_date, config.sampling.end_date);
    let range_days = range.len();
    let coverage = observed_days as f64 / range_days as f64 * 100.0;

    println!("\nSampling Window:");
    println!("  Range:         {range} ({range_days} days)");
    println!("  Observed days: {observed_days} of {range_days} ({coverage:.1}%)");
    println!("  Simulations:   {}", config.sampling.simulation_count);
    println!("  Seed:          {}", config.sampling.seed);

    println!("\nExecution:");
    println!("  Design:        {}", config.design.path.display());
    println!("  Workers:       {}", config.execution.workers);

    let sym = if observed_days > 0 { "✓" } else { "✗" };
    let verdict = if observed_days > 0 {
        "Window is sampleable"
    } else {
        "No observations inside the sampling window"
    };
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{sym} {verdict}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Print the sampling plan report after a sampler run.
pub fn print_sample_report(
    request: &SimulationRequest,
    seed: u64,
    observed_days: usize,
    produced: usize,
) {
    let day_count = request.date_range.len();
    let random = WindSampler::uses_random_draws(day_count, request.simulation_count);
    let rate = day_count as f64 / request.simulation_count as f64;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Sampling Plan");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("  Design:        {}", request.design.display());
    println!("  Window:        {} ({day_count} days)", request.date_range);
    println!("  Observed days: {observed_days}");
    println!("  Simulations:   {}", request.simulation_count);
    println!("  Seed:          {seed}");
    println!(
        "  Regime:        {} (rate {rate:.2})",
        if random {
            "random draws with replacement"
        } else {
            "sequential duplication with random fill"
        }
    );

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Produced {produced} wind profiles");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Print the landing statistics report.
pub fn print_summary_report(summary: &StatisticsSummary) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Landing Dispersion Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("  Samples:       {}", summary.samples);
    println!("  Mean range:    {:.1} m", summary.mean_range_m);
    println!("  Range std:     {:.1} m", summary.std_range_m);
    println!(
        "  Mean bearing:  {:.1}° ({:.4} rad)",
        summary.mean_bearing_deg(),
        summary.mean_bearing_rad
    );
    println!(
        "  Bearing std:   {:.1}° ({:.4} rad)",
        summary.std_bearing_deg(),
        summary.std_bearing_rad
    );
    println!("  Mean apogee:   {:.1} m", summary.mean_apogee_m);

    if !summary.confidence_radii.is_empty() {
        println!("\nConfidence Radii:");
        for radius in &summary.confidence_radii {
            println!(
                "  {:>5.1}%  within {:.1} m of the mean landing distance",
                radius.level * 100.0,
                radius.radius_m
            );
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
