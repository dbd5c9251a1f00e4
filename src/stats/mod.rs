//! Landing dispersion statistics.
//!
//! Accumulates per-run results and reduces them to range, bearing, and
//! apogee aggregates plus confidence radii. Spread uses the population
//! standard deviation (divide by N) because the accumulated runs are the
//! whole population of interest, not a sample from a larger one. Bearing
//! aggregates are arithmetic over principal-value radians.

use serde::Serialize;

use crate::error::{DispersionError, DispersionResult};
use crate::flight::RunResult;

/// Chi-square quantile for two degrees of freedom.
///
/// With two degrees of freedom the CDF is `1 - exp(-x/2)`, so the
/// quantile has the closed form `-2 ln(1 - p)`. Landing scatter has two
/// planar coordinates, hence two degrees of freedom.
#[must_use]
pub fn chi_square_quantile_df2(p: f64) -> f64 {
    -2.0 * (1.0 - p).ln()
}

/// One confidence circle around the mean landing distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceRadius {
    /// Confidence level in (0, 1).
    pub level: f64,
    /// Radius of the circle in meters.
    pub radius_m: f64,
}

/// A landing point projected onto the launch-site plane.
///
/// `x_m` grows east, `y_m` grows north, matching the bearing convention
/// where east is zero and north is pi/2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LandingPoint {
    /// Eastward offset from the launch site in meters.
    pub x_m: f64,
    /// Northward offset from the launch site in meters.
    pub y_m: f64,
}

/// Aggregate view over every accumulated run.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSummary {
    /// Number of accumulated runs.
    pub samples: usize,
    /// Mean landing distance in meters.
    pub mean_range_m: f64,
    /// Population standard deviation of landing distance in meters.
    pub std_range_m: f64,
    /// Mean landing bearing in radians.
    pub mean_bearing_rad: f64,
    /// Population standard deviation of bearing in radians.
    pub std_bearing_rad: f64,
    /// Mean apogee in meters.
    pub mean_apogee_m: f64,
    /// Confidence radii in the configured level order.
    pub confidence_radii: Vec<ConfidenceRadius>,
}

impl StatisticsSummary {
    /// Mean bearing in degrees.
    #[must_use]
    pub fn mean_bearing_deg(&self) -> f64 {
        self.mean_bearing_rad.to_degrees()
    }

    /// Bearing standard deviation in degrees.
    #[must_use]
    pub fn std_bearing_deg(&self) -> f64 {
        self.std_bearing_rad.to_degrees()
    }
}

/// Accumulator for landing dispersion statistics.
#[derive(Debug, Clone)]
pub struct LandingStatistics {
    results: Vec<RunResult>,
    confidence_levels: Vec<f64>,
}

impl LandingStatistics {
    /// Create an accumulator reporting radii at the given levels.
    ///
    /// Levels are kept in the given order and reported in it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any level is outside (0, 1).
    pub fn new(confidence_levels: &[f64]) -> DispersionResult<Self> {
        for &level in confidence_levels {
            if level <= 0.0 || level >= 1.0 {
                return Err(DispersionError::config(format!(
                    "confidence level must be between 0 and 1, got {level}"
                )));
            }
        }
        Ok(Self {
            results: Vec::new(),
            confidence_levels: confidence_levels.to_vec(),
        })
    }

    /// Accumulator with the standard 80/90/99 levels.
    #[must_use]
    pub fn with_default_levels() -> Self {
        Self {
            results: Vec::new(),
            confidence_levels: vec![0.80, 0.90, 0.99],
        }
    }

    /// Record one landed run.
    pub fn add(&mut self, result: RunResult) {
        self.results.push(result);
    }

    /// Record a batch of landed runs, preserving their order.
    pub fn add_all(&mut self, results: &[RunResult]) {
        self.results.extend_from_slice(results);
    }

    /// Number of accumulated runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing has been accumulated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Configured confidence levels.
    #[must_use]
    pub fn confidence_levels(&self) -> &[f64] {
        &self.confidence_levels
    }

    /// Reduce the accumulated runs to their aggregate summary.
    ///
    /// Each confidence radius is `sqrt(quantile) * std_range` where the
    /// quantile is chi-square with two degrees of freedom at that level:
    /// the circle around the mean distance expected to contain that share
    /// of landings under a bivariate normal scatter model.
    ///
    /// # Errors
    ///
    /// Returns an empty-data error when no runs have been accumulated.
    pub fn summary(&self) -> DispersionResult<StatisticsSummary> {
        if self.results.is_empty() {
            return Err(DispersionError::empty_data(
                "summary requested before any run was recorded",
            ));
        }

        let ranges: Vec<f64> = self.results.iter().map(|r| r.range_m).collect();
        let bearings: Vec<f64> = self.results.iter().map(|r| r.bearing_rad).collect();

        let (mean_range_m, std_range_m) = population_stats(&ranges);
        let (mean_bearing_rad, std_bearing_rad) = population_stats(&bearings);
        let mean_apogee_m =
            self.results.iter().map(|r| r.apogee_m).sum::<f64>() / self.results.len() as f64;

        let confidence_radii = self
            .confidence_levels
            .iter()
            .map(|&level| ConfidenceRadius {
                level,
                radius_m: chi_square_quantile_df2(level).sqrt() * std_range_m,
            })
            .collect();

        Ok(StatisticsSummary {
            samples: self.results.len(),
            mean_range_m,
            std_range_m,
            mean_bearing_rad,
            std_bearing_rad,
            mean_apogee_m,
            confidence_radii,
        })
    }

    /// Landing points on the launch-site plane, in insertion order.
    #[must_use]
    pub fn landing_points(&self) -> Vec<LandingPoint> {
        self.results
            .iter()
            .map(|r| LandingPoint {
                x_m: r.range_m * r.bearing_rad.cos(),
                y_m: r.range_m * r.bearing_rad.sin(),
            })
            .collect()
    }
}

/// Mean and population standard deviation of a non-empty slice.
fn population_stats(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
