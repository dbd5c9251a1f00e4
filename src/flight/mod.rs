//! Flight engine boundary: the trait the external simulator implements
//! and the per-run result extracted from its telemetry.
//!
//! The engine is a black box owning all flight dynamics. One engine
//! instance holds one loaded design and one mutable wind configuration,
//! so instances must never be shared across workers; the batch executor
//! builds one per worker instead.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DispersionError, DispersionResult};
use crate::wind::WindProfile;

pub mod geometry;
pub mod runner;

pub use runner::{BatchConfig, BatchOutcome, DispersionBatch, RunFailure, SimulationRunner};

/// A world position as the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    /// Latitude in degrees.
    pub latitude_deg: f64,
    /// Longitude in degrees.
    pub longitude_deg: f64,
}

/// What one finished flight reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightTelemetry {
    /// Altitude samples over the flight, in meters, engine sample order.
    pub altitude_m: Vec<f64>,
    /// Where the rocket came down.
    pub landing: GeoPosition,
    /// Where it started.
    pub launch_site: GeoPosition,
}

impl FlightTelemetry {
    /// Maximum altitude reached, or `None` for an empty series.
    #[must_use]
    pub fn apogee_m(&self) -> Option<f64> {
        if self.altitude_m.is_empty() {
            return None;
        }
        Some(self.altitude_m.iter().copied().fold(f64::MIN, f64::max))
    }
}

/// Contract required from the external flight simulator.
///
/// `Design` is an opaque handle to one loaded rocket design; the engine
/// decides what it holds.
pub trait FlightEngine {
    /// Opaque loaded-design handle.
    type Design;

    /// Load a rocket design from its file reference.
    ///
    /// # Errors
    ///
    /// Returns the design-load error if the reference is unreadable or
    /// corrupt.
    fn load_design(&mut self, reference: &Path) -> DispersionResult<Self::Design>;

    /// Replace the design's wind configuration with the given profile.
    ///
    /// Any previously configured levels must be fully cleared first; the
    /// call is idempotent per profile.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the configuration is rejected.
    fn configure_wind(
        &mut self,
        design: &mut Self::Design,
        profile: &WindProfile,
    ) -> DispersionResult<()>;

    /// Fly the design once and report telemetry.
    ///
    /// # Errors
    ///
    /// Returns the engine error for any internal failure (numerical
    /// divergence, invalid configuration).
    fn run(&mut self, design: &mut Self::Design) -> DispersionResult<FlightTelemetry>;
}

/// Per-simulation output: what one landed flight contributes to the
/// dispersion statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Distance from launch site to landing point in meters.
    pub range_m: f64,
    /// Landing direction in radians (east = 0, north = pi/2).
    pub bearing_rad: f64,
    /// Maximum altitude reached in meters.
    pub apogee_m: f64,
}

impl RunResult {
    /// Extract the per-run result from telemetry.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the altitude series is empty, since
    /// apogee is undefined without samples.
    pub fn from_telemetry(telemetry: &FlightTelemetry) -> DispersionResult<Self> {
        let apogee_m = telemetry
            .apogee_m()
            .ok_or_else(|| DispersionError::engine("telemetry carries no altitude samples"))?;

        Ok(Self {
            range_m: geometry::range_flat(telemetry.launch_site, telemetry.landing),
            bearing_rad: geometry::bearing_flat(telemetry.launch_site, telemetry.landing),
            apogee_m,
        })
    }
}
