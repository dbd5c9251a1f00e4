//! # dispersim
//!
//! Monte Carlo landing dispersion for rocket flights.
//!
//! Samples historical wind observations over a calendar window, flies an
//! external flight engine once per sampled profile, and reduces the
//! landings to range, bearing, and apogee statistics with confidence
//! radii around the mean landing distance.
//!
//! ## Example
//!
//! ```rust
//! use dispersim::prelude::*;
//!
//! let mut stats = LandingStatistics::with_default_levels();
//! stats.add(RunResult { range_m: 120.0, bearing_rad: 0.5, apogee_m: 900.0 });
//! stats.add(RunResult { range_m: 140.0, bearing_rad: 0.6, apogee_m: 910.0 });
//!
//! let summary = stats.summary().ok();
//! assert!(summary.is_some_and(|s| s.samples == 2));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suspicious_operation_groupings,  // False positive for variance = E[X²] - E[X]²
    clippy::suboptimal_flops,  // Plain formulas match the published geometry
    clippy::imprecise_flops,   // Numerical code choices are intentional
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flight;
pub mod rng;
pub mod stats;
pub mod wind;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{
        DateRange, DispersionConfig, DispersionConfigBuilder, SimulationRequest,
    };
    pub use crate::error::{DispersionError, DispersionResult};
    pub use crate::flight::{
        BatchConfig, BatchOutcome, DispersionBatch, FlightEngine, FlightTelemetry, GeoPosition,
        RunResult, SimulationRunner,
    };
    pub use crate::rng::DispersionRng;
    pub use crate::stats::{LandingStatistics, StatisticsSummary};
    pub use crate::wind::{WindDatabase, WindLevel, WindProfile, WindSampler};
}

/// Re-export for public API
pub use error::{DispersionError, DispersionResult};
