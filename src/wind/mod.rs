//! Wind data model: historical observations and per-simulation profiles.
//!
//! A [`WindObservation`] is what the historical dataset recorded for one
//! calendar day; a [`WindProfile`] is what one simulated flight consumes.
//! The two differ only in the `deviation` field, which is stamped at
//! profile-build time from configuration.

use chrono::NaiveDate;

pub mod database;
pub mod sampler;

pub use database::WindDatabase;
pub use sampler::WindSampler;

/// Wind at one altitude: one entry of a profile or observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindLevel {
    /// Altitude of the measurement in meters.
    pub altitude_m: f64,
    /// Wind speed.
    pub speed: f64,
    /// Wind heading in degrees.
    pub heading_deg: f64,
    /// Speed deviation handed to the engine's wind model.
    pub deviation: f64,
}

impl WindLevel {
    /// The 4-tuple shape the external engine's wind-level API expects:
    /// `(altitude, speed, heading, deviation)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.altitude_m, self.speed, self.heading_deg, self.deviation)
    }
}

/// One day's historical wind column, keyed by date.
///
/// Only built by [`WindDatabase`]; the level sequence is non-empty and
/// ordered as recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct WindObservation {
    /// Calendar day of the observation.
    pub date: NaiveDate,
    /// Ordered altitude levels as recorded.
    pub levels: Vec<WindLevel>,
}

/// The per-simulation wind column consumed by the flight engine.
///
/// Exactly one profile is produced per simulation slot; the sampler owns
/// the count contract.
#[derive(Debug, Clone, PartialEq)]
pub struct WindProfile {
    /// Ordered altitude levels, same order as the source observation.
    pub levels: Vec<WindLevel>,
}

impl WindProfile {
    /// Build a profile from an observation, stamping every level with the
    /// configured deviation.
    #[must_use]
    pub fn from_observation(observation: &WindObservation, default_deviation: f64) -> Self {
        let levels = observation
            .levels
            .iter()
            .map(|level| WindLevel {
                deviation: default_deviation,
                ..*level
            })
            .collect();
        Self { levels }
    }

    /// Number of altitude levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the profile has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The ordered 4-tuple sequence for the engine's wind-level API.
    #[must_use]
    pub fn as_tuples(&self) -> Vec<(f64, f64, f64, f64)> {
        self.levels.iter().map(WindLevel::as_tuple).collect()
    }
}
