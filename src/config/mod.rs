//! Experiment configuration with YAML schema and validation.
//!
//! Mistake-proofing happens in three layers:
//! - Type-safe configuration structs
//! - Declarative constraints via serde + validator
//! - Runtime semantic validation (cross-field rules)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{DispersionError, DispersionResult};

/// Top-level dispersion experiment configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DispersionConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Experiment metadata.
    #[validate(nested)]
    #[serde(default)]
    pub experiment: ExperimentMeta,

    /// Rocket design reference.
    #[validate(nested)]
    pub design: DesignConfig,

    /// Wind dataset settings.
    #[validate(nested)]
    pub wind: WindConfig,

    /// Sampling settings (count, date range, seed).
    #[validate(nested)]
    pub sampling: SamplingConfig,

    /// Statistics settings.
    #[validate(nested)]
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Batch execution settings.
    #[validate(nested)]
    #[serde(default)]
    pub execution: ExecutionConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl DispersionConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> DispersionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> DispersionResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        // Declarative constraints first
        config.validate()?;

        // Cross-field rules
        config.validate_semantic()?;

        Ok(config)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> DispersionConfigBuilder {
        DispersionConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> DispersionResult<()> {
        if !has_ork_extension(&self.design.path) {
            return Err(DispersionError::config(format!(
                "Design file must have an .ork extension, got {}",
                self.design.path.display()
            )));
        }

        for &level in &self.statistics.confidence_levels {
            if !(level > 0.0 && level < 1.0) {
                return Err(DispersionError::config(format!(
                    "Confidence levels must lie strictly between 0 and 1, got {level}"
                )));
            }
        }

        if let Some(timeout) = self.execution.run_timeout_secs {
            if timeout <= 0.0 {
                return Err(DispersionError::config(format!(
                    "Run timeout must be positive, got {timeout}"
                )));
            }
        }

        Ok(())
    }

    /// Build the validated simulation request from this configuration.
    ///
    /// Reversed dates are normalized by swapping, matching the input
    /// surface this core replaces.
    ///
    /// # Errors
    ///
    /// Returns error if the design path or simulation count is rejected.
    pub fn request(&self) -> DispersionResult<SimulationRequest> {
        SimulationRequest::new(
            self.design.path.clone(),
            self.sampling.simulation_count,
            self.sampling.start_date,
            self.sampling.end_date,
        )
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct DispersionConfigBuilder {
    name: Option<String>,
    design: Option<PathBuf>,
    dataset: Option<PathBuf>,
    seed: Option<u64>,
    simulation_count: Option<usize>,
    dates: Option<(NaiveDate, NaiveDate)>,
    workers: Option<usize>,
}

impl DispersionConfigBuilder {
    /// Set the experiment name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the rocket design path.
    #[must_use]
    pub fn design(mut self, path: impl Into<PathBuf>) -> Self {
        self.design = Some(path.into());
        self
    }

    /// Set the wind dataset path.
    #[must_use]
    pub fn dataset(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset = Some(path.into());
        self
    }

    /// Set the master seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the simulation count.
    #[must_use]
    pub const fn simulation_count(mut self, count: usize) -> Self {
        self.simulation_count = Some(count);
        self
    }

    /// Set the sampling date range.
    #[must_use]
    pub const fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.dates = Some((start, end));
        self
    }

    /// Set the worker count.
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a required field (design, dataset, seed, count,
    /// dates) is missing, or if the assembled configuration fails
    /// validation.
    pub fn build(self) -> DispersionResult<DispersionConfig> {
        let design = self
            .design
            .ok_or_else(|| DispersionError::config("Builder is missing the design path"))?;
        let dataset = self
            .dataset
            .ok_or_else(|| DispersionError::config("Builder is missing the wind dataset path"))?;
        let seed = self
            .seed
            .ok_or_else(|| DispersionError::config("Builder is missing the seed"))?;
        let simulation_count = self
            .simulation_count
            .ok_or_else(|| DispersionError::config("Builder is missing the simulation count"))?;
        let (start_date, end_date) = self
            .dates
            .ok_or_else(|| DispersionError::config("Builder is missing the date range"))?;

        let config = DispersionConfig {
            schema_version: default_schema_version(),
            experiment: ExperimentMeta {
                name: self.name.unwrap_or_default(),
                description: String::new(),
            },
            design: DesignConfig { path: design },
            wind: WindConfig {
                dataset,
                period: default_period(),
                default_deviation: default_deviation(),
            },
            sampling: SamplingConfig {
                simulation_count,
                start_date,
                end_date,
                seed,
            },
            statistics: StatisticsConfig::default(),
            execution: ExecutionConfig {
                workers: self.workers.unwrap_or_else(default_workers),
                ..ExecutionConfig::default()
            },
        };

        config.validate()?;
        config.validate_semantic()?;

        Ok(config)
    }
}

/// Experiment metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExperimentMeta {
    /// Experiment name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Rocket design reference.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DesignConfig {
    /// Path to the design file handed to the flight engine.
    ///
    /// Validated by `.ork` suffix only; content is the engine's business.
    pub path: PathBuf,
}

/// Wind dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WindConfig {
    /// Path to the historical wind observation file (JSON).
    pub dataset: PathBuf,

    /// Daily period key to index ("AM" in the historical datasets).
    #[validate(length(min = 1))]
    #[serde(default = "default_period")]
    pub period: String,

    /// Deviation value stamped on every wind level handed to the engine.
    #[serde(default = "default_deviation")]
    pub default_deviation: f64,
}

fn default_period() -> String {
    "AM".to_string()
}

const fn default_deviation() -> f64 {
    0.0
}

/// Sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SamplingConfig {
    /// Number of simulations to run.
    #[validate(range(min = 1))]
    pub simulation_count: usize,

    /// First day of the historical window (inclusive).
    pub start_date: NaiveDate,

    /// Last day of the historical window (inclusive).
    pub end_date: NaiveDate,

    /// Master seed for all random day draws.
    pub seed: u64,
}

/// Statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatisticsConfig {
    /// Confidence levels for landing-zone radii, each strictly in (0, 1).
    #[validate(length(min = 1))]
    #[serde(default = "default_confidence_levels")]
    pub confidence_levels: Vec<f64>,
}

fn default_confidence_levels() -> Vec<f64> {
    vec![0.80, 0.90, 0.99]
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            confidence_levels: default_confidence_levels(),
        }
    }
}

/// Batch execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExecutionConfig {
    /// Worker count; each worker owns its own engine instance.
    #[validate(range(min = 1))]
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Wall-time limit per flight in seconds.
    ///
    /// The engine call is blocking, so the limit is enforced by measuring
    /// elapsed time around the call; an overrunning flight is recorded as
    /// timed out once it returns.
    #[serde(default)]
    pub run_timeout_secs: Option<f64>,

    /// Record per-run failures and keep going (true), or cancel the batch
    /// on the first failure (false).
    #[serde(default = "default_true")]
    pub continue_on_failure: bool,
}

const fn default_workers() -> usize {
    1
}

const fn default_true() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            run_timeout_secs: None,
            continue_on_failure: true,
        }
    }
}

/// Inclusive calendar date range, start <= end by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range from two dates, swapping them if given reversed.
    #[must_use]
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// First day (inclusive).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of distinct calendar days, both ends included.
    ///
    /// Never zero: a single-day range has length 1.
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // start <= end by construction
    pub fn len(&self) -> u64 {
        (self.end.signed_duration_since(self.start).num_days() + 1) as u64
    }

    /// A range is never empty; kept for API symmetry with `len`.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether the given date falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterate the days of the range in calendar order.
    #[allow(clippy::cast_possible_truncation)] // day counts are far below usize::MAX
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len() as usize)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Immutable, validated input to the sampling pipeline.
///
/// Consumed once by the wind sampler; carries everything the pipeline
/// needs to know about what the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRequest {
    /// Rocket design path, `.ork` suffix verified.
    pub design: PathBuf,
    /// Number of simulations to run, at least 1.
    pub simulation_count: usize,
    /// Historical window to sample from.
    pub date_range: DateRange,
}

impl SimulationRequest {
    /// Validate and construct a request.
    ///
    /// Reversed dates are swapped rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns the invalid-request error if `simulation_count` is zero or
    /// the design path does not end in `.ork`.
    pub fn new(
        design: impl Into<PathBuf>,
        simulation_count: usize,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DispersionResult<Self> {
        let design = design.into();

        if simulation_count == 0 {
            return Err(DispersionError::invalid_request(
                "simulation_count must be at least 1",
            ));
        }

        if !has_ork_extension(&design) {
            return Err(DispersionError::invalid_request(format!(
                "design file must have an .ork extension, got {}",
                design.display()
            )));
        }

        Ok(Self {
            design,
            simulation_count,
            date_range: DateRange::new(start, end),
        })
    }
}

fn has_ork_extension(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| ext == "ork")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const VALID_YAML: &str = r"
design:
  path: rockets/ares.ork
wind:
  dataset: data/winds.json
sampling:
  simulation_count: 50
  start_date: 2022-05-01
  end_date: 2022-05-14
  seed: 42
";

    #[test]
    fn test_config_yaml_parse() {
        let config = DispersionConfig::from_yaml(VALID_YAML);
        assert!(config.is_ok());

        let config = config.ok();
        assert_eq!(
            config.as_ref().map(|c| c.sampling.simulation_count),
            Some(50)
        );
        assert_eq!(config.as_ref().map(|c| c.sampling.seed), Some(42));
    }

    #[test]
    fn test_config_defaults_applied() {
        let config = DispersionConfig::from_yaml(VALID_YAML).ok();
        assert!(config.is_some());
        let config = config.as_ref();

        assert_eq!(config.map(|c| c.schema_version.as_str()), Some("1.0"));
        assert_eq!(config.map(|c| c.wind.period.as_str()), Some("AM"));
        assert_eq!(config.map(|c| c.wind.default_deviation), Some(0.0));
        assert_eq!(config.map(|c| c.execution.workers), Some(1));
        assert_eq!(config.map(|c| c.execution.continue_on_failure), Some(true));
        assert_eq!(
            config.map(|c| c.statistics.confidence_levels.clone()),
            Some(vec![0.80, 0.90, 0.99])
        );
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let yaml = format!("{VALID_YAML}\nplotting: fancy\n");
        assert!(DispersionConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_config_rejects_zero_count() {
        let yaml = VALID_YAML.replace("simulation_count: 50", "simulation_count: 0");
        assert!(DispersionConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_config_rejects_empty_period() {
        let yaml = VALID_YAML.replace(
            "wind:\n  dataset: data/winds.json",
            "wind:\n  dataset: data/winds.json\n  period: \"\"",
        );
        assert!(DispersionConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_config_rejects_non_ork_design() {
        let yaml = VALID_YAML.replace("rockets/ares.ork", "rockets/ares.rkt");
        let err = DispersionConfig::from_yaml(&yaml);
        assert!(err.is_err());
        let msg = err.err().map(|e| e.to_string());
        assert!(msg.is_some_and(|m| m.contains(".ork")));
    }

    #[test]
    fn test_config_rejects_confidence_out_of_bounds() {
        let yaml = format!("{VALID_YAML}statistics:\n  confidence_levels: [0.9, 1.0]\n");
        assert!(DispersionConfig::from_yaml(&yaml).is_err());

        let yaml = format!("{VALID_YAML}statistics:\n  confidence_levels: [0.0]\n");
        assert!(DispersionConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_config_rejects_non_positive_timeout() {
        let yaml = format!("{VALID_YAML}execution:\n  run_timeout_secs: 0.0\n");
        assert!(DispersionConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_config_execution_section_parse() {
        let yaml = format!(
            "{VALID_YAML}execution:\n  workers: 4\n  run_timeout_secs: 30.0\n  continue_on_failure: false\n"
        );
        let config = DispersionConfig::from_yaml(&yaml).ok();
        assert!(config.is_some());
        let config = config.as_ref();
        assert_eq!(config.map(|c| c.execution.workers), Some(4));
        assert_eq!(
            config.and_then(|c| c.execution.run_timeout_secs),
            Some(30.0)
        );
        assert_eq!(
            config.map(|c| c.execution.continue_on_failure),
            Some(false)
        );
    }

    #[test]
    fn test_config_builder() {
        let config = DispersionConfig::builder()
            .name("maiden flight")
            .design("ares.ork")
            .dataset("winds.json")
            .seed(7)
            .simulation_count(20)
            .dates(date(2022, 5, 1), date(2022, 5, 10))
            .workers(2)
            .build();

        assert!(config.is_ok());
        let config = config.ok();
        assert_eq!(config.as_ref().map(|c| c.sampling.seed), Some(7));
        assert_eq!(config.as_ref().map(|c| c.execution.workers), Some(2));
        assert_eq!(
            config.as_ref().map(|c| c.experiment.name.as_str() == "maiden flight"),
            Some(true)
        );
    }

    #[test]
    fn test_config_builder_missing_field() {
        let result = DispersionConfig::builder()
            .design("ares.ork")
            .seed(7)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_request_normalizes_reversed_dates() {
        let request = SimulationRequest::new(
            "ares.ork",
            10,
            date(2022, 5, 14),
            date(2022, 5, 1),
        );
        assert!(request.is_ok());
        let request = request.ok();
        assert_eq!(
            request.as_ref().map(|r| r.date_range.start()),
            Some(date(2022, 5, 1))
        );
        assert_eq!(
            request.as_ref().map(|r| r.date_range.end()),
            Some(date(2022, 5, 14))
        );
    }

    #[test]
    fn test_request_rejects_zero_count() {
        let request = SimulationRequest::new("ares.ork", 0, date(2022, 5, 1), date(2022, 5, 2));
        assert!(request.is_err());
    }

    #[test]
    fn test_request_rejects_bad_suffix() {
        let request =
            SimulationRequest::new("ares.rocket", 10, date(2022, 5, 1), date(2022, 5, 2));
        assert!(request.is_err());

        // No extension at all
        let request = SimulationRequest::new("ares", 10, date(2022, 5, 1), date(2022, 5, 2));
        assert!(request.is_err());
    }

    #[test]
    fn test_config_request_roundtrip() {
        let config = DispersionConfig::from_yaml(VALID_YAML).ok();
        assert!(config.is_some());
        let request = config.as_ref().map(|c| c.request());
        assert!(request.as_ref().is_some_and(|r| r.is_ok()));
    }

    #[test]
    fn test_date_range_len_inclusive() {
        let range = DateRange::new(date(2022, 5, 1), date(2022, 5, 14));
        assert_eq!(range.len(), 14);

        let single = DateRange::new(date(2022, 5, 1), date(2022, 5, 1));
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }

    #[test]
    fn test_date_range_swaps_reversed() {
        let range = DateRange::new(date(2022, 6, 30), date(2022, 6, 1));
        assert_eq!(range.start(), date(2022, 6, 1));
        assert_eq!(range.end(), date(2022, 6, 30));
        assert_eq!(range.len(), 30);
    }

    #[test]
    fn test_date_range_days_in_order() {
        let range = DateRange::new(date(2022, 5, 30), date(2022, 6, 2));
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(
            days,
            vec![
                date(2022, 5, 30),
                date(2022, 5, 31),
                date(2022, 6, 1),
                date(2022, 6, 2),
            ]
        );
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(date(2022, 5, 1), date(2022, 5, 14));
        assert!(range.contains(date(2022, 5, 1)));
        assert!(range.contains(date(2022, 5, 7)));
        assert!(range.contains(date(2022, 5, 14)));
        assert!(!range.contains(date(2022, 4, 30)));
        assert!(!range.contains(date(2022, 5, 15)));
    }

    #[test]
    fn test_date_range_display() {
        let range = DateRange::new(date(2022, 5, 1), date(2022, 5, 14));
        assert_eq!(range.to_string(), "2022-05-01..2022-05-14");
    }

    #[test]
    fn test_date_range_crosses_year_boundary() {
        let range = DateRange::new(date(2021, 12, 30), date(2022, 1, 2));
        assert_eq!(range.len(), 4);
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], date(2022, 1, 1));
    }

    #[test]
    fn test_statistics_config_default() {
        let config = StatisticsConfig::default();
        assert_eq!(config.confidence_levels, vec![0.80, 0.90, 0.99]);
    }

    #[test]
    fn test_execution_config_default() {
        let config = ExecutionConfig::default();
        assert_eq!(config.workers, 1);
        assert!(config.run_timeout_secs.is_none());
        assert!(config.continue_on_failure);
    }

    #[test]
    fn test_experiment_meta_default() {
        let meta = ExperimentMeta::default();
        assert!(meta.name.is_empty());
        assert!(meta.description.is_empty());
    }
}
