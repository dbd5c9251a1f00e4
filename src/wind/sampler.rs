//! Wind profile sampling: the simulation-budget partitioning algorithm.
//!
//! The sampling rate `|date_range| / simulation_count` decides the regime:
//!
//! - rate > 1 (more days than simulations): every profile is drawn at
//!   random, with replacement, from the observed days of the range.
//! - rate <= 1 (at least one simulation per day): every observed day first
//!   contributes `simulation_count / |date_range|` duplicate profiles in
//!   calendar order, then the remaining slots are filled by random draws.
//!
//! Either way the output length equals `simulation_count` exactly. Random
//! draws come from the observed-day subset, so a draw can never miss and
//! leave the batch short.

use chrono::NaiveDate;

use crate::config::{DateRange, SimulationRequest};
use crate::error::{DispersionError, DispersionResult};
use crate::rng::DispersionRng;
use crate::wind::{WindDatabase, WindProfile};

/// Produces exactly one wind profile per simulation slot.
#[derive(Debug)]
pub struct WindSampler<'a> {
    database: &'a WindDatabase,
    default_deviation: f64,
}

impl<'a> WindSampler<'a> {
    /// Create a sampler over a loaded database.
    ///
    /// `default_deviation` is stamped on every level of every produced
    /// profile.
    #[must_use]
    pub const fn new(database: &'a WindDatabase, default_deviation: f64) -> Self {
        Self {
            database,
            default_deviation,
        }
    }

    /// Whether this many candidate days against this many simulations
    /// selects the random regime (rate above 1) rather than the
    /// sequential one.
    #[must_use]
    pub const fn uses_random_draws(day_count: u64, simulation_count: usize) -> bool {
        day_count > simulation_count as u64
    }

    /// Sample profiles for a validated request.
    ///
    /// # Errors
    ///
    /// Same contract as [`WindSampler::sample`].
    pub fn sample_request(
        &self,
        request: &SimulationRequest,
        rng: &mut DispersionRng,
    ) -> DispersionResult<Vec<WindProfile>> {
        self.sample(&request.date_range, request.simulation_count, rng)
    }

    /// Sample `simulation_count` profiles from the days of `range`.
    ///
    /// # Errors
    ///
    /// Returns the invalid-request error for a zero count, and the
    /// data-source error when no day of the range has an observation.
    pub fn sample(
        &self,
        range: &DateRange,
        simulation_count: usize,
        rng: &mut DispersionRng,
    ) -> DispersionResult<Vec<WindProfile>> {
        let days: Vec<NaiveDate> = range.days().collect();
        self.sample_days(&days, simulation_count, rng)
    }

    /// Sample `simulation_count` profiles from an explicit ordered day list.
    ///
    /// This is the core of the algorithm; [`WindSampler::sample`] feeds it
    /// the days of a calendar range.
    ///
    /// # Errors
    ///
    /// Returns the invalid-request error for a zero count, the
    /// invalid-range error for an empty day list, and the data-source
    /// error when none of the days has an observation.
    pub fn sample_days(
        &self,
        days: &[NaiveDate],
        simulation_count: usize,
        rng: &mut DispersionRng,
    ) -> DispersionResult<Vec<WindProfile>> {
        if simulation_count == 0 {
            return Err(DispersionError::invalid_request(
                "simulation_count must be at least 1",
            ));
        }
        if days.is_empty() {
            return Err(DispersionError::invalid_range("no days to sample from"));
        }

        let observed: Vec<NaiveDate> = days
            .iter()
            .copied()
            .filter(|day| self.database.contains(*day))
            .collect();
        if observed.is_empty() {
            return Err(DispersionError::data_source(format!(
                "no wind observations for any of the {} sampled days ({}..{})",
                days.len(),
                days[0],
                days[days.len() - 1]
            )));
        }

        let mut profiles = Vec::with_capacity(simulation_count);

        if Self::uses_random_draws(days.len() as u64, simulation_count) {
            // rate > 1: pure random draws with replacement
            tracing::debug!(
                days = days.len(),
                observed = observed.len(),
                simulations = simulation_count,
                "random sampling regime"
            );
            for _ in 0..simulation_count {
                profiles.push(self.draw(&observed, rng)?);
            }
        } else {
            // rate <= 1: exhaustive pass first, random fill for the rest
            let per_day = simulation_count / days.len();
            for day in days {
                if let Some(observation) = self.database.get(*day) {
                    for _ in 0..per_day {
                        profiles.push(WindProfile::from_observation(
                            observation,
                            self.default_deviation,
                        ));
                    }
                }
            }

            let fill = simulation_count - profiles.len();
            tracing::debug!(
                days = days.len(),
                observed = observed.len(),
                simulations = simulation_count,
                per_day,
                fill,
                "sequential sampling regime"
            );
            for _ in 0..fill {
                profiles.push(self.draw(&observed, rng)?);
            }
        }

        debug_assert_eq!(profiles.len(), simulation_count);
        Ok(profiles)
    }

    /// One random draw, uniform with replacement over observed days.
    fn draw(
        &self,
        observed: &[NaiveDate],
        rng: &mut DispersionRng,
    ) -> DispersionResult<WindProfile> {
        let day = observed[rng.gen_index(observed.len())];
        let observation = self.database.get(day).ok_or_else(|| {
            DispersionError::data_source(format!("observation for {day} vanished during sampling"))
        })?;
        Ok(WindProfile::from_observation(
            observation,
            self.default_deviation,
        ))
    }
}
