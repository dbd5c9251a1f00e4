//! Flight execution: one engine run per sampled wind profile.
//!
//! [`SimulationRunner`] drives a single engine instance through the
//! configure-wind, run, extract cycle. [`DispersionBatch`] fans a profile
//! list out over worker threads with work stealing, one engine instance
//! per worker because engines are stateful and must not be shared.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossbeam_deque::{Injector, Steal, Stealer, Worker};

use crate::error::{DispersionError, DispersionResult};
use crate::wind::WindProfile;

use super::{FlightEngine, RunResult};

/// Drives one flight engine through repeated single runs.
///
/// Holds the engine together with its loaded design so the design is
/// loaded once and reused across every profile the runner flies.
pub struct SimulationRunner<E: FlightEngine> {
    engine: E,
    design: E::Design,
    timeout: Option<Duration>,
}

impl<E: FlightEngine> SimulationRunner<E> {
    /// Load the design and wrap the engine for repeated runs.
    ///
    /// # Errors
    ///
    /// Returns the design-load error if the engine rejects the reference.
    pub fn new(mut engine: E, design_reference: &Path) -> DispersionResult<Self> {
        let design = engine.load_design(design_reference)?;
        Ok(Self {
            engine,
            design,
            timeout: None,
        })
    }

    /// Set a wall-time limit per run.
    ///
    /// The engine call itself is not interrupted; an overrun is detected
    /// after the call returns and reported as a timeout failure.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fly the design once under the given wind profile.
    ///
    /// # Errors
    ///
    /// Returns the engine error if configuration or the run fails, and the
    /// timeout error if the run exceeded the configured limit.
    pub fn fly(&mut self, profile: &WindProfile) -> DispersionResult<RunResult> {
        self.engine.configure_wind(&mut self.design, profile)?;

        let started = Instant::now();
        let telemetry = self.engine.run(&mut self.design)?;
        let elapsed = started.elapsed();

        if let Some(limit) = self.timeout {
            if elapsed > limit {
                return Err(DispersionError::timeout(elapsed, limit));
            }
        }

        RunResult::from_telemetry(&telemetry)
    }
}

/// Execution policy for a dispersion batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    workers: usize,
    run_timeout: Option<Duration>,
    continue_on_failure: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(4),
            run_timeout: None,
            continue_on_failure: true,
        }
    }
}

impl BatchConfig {
    /// Create a config with default worker count and failure policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads (minimum 1).
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { 1 } else { workers };
        self
    }

    /// Set the per-run wall-time limit.
    #[must_use]
    pub const fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Choose whether a run failure cancels the rest of the batch.
    #[must_use]
    pub const fn with_continue_on_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_failure = continue_on_failure;
        self
    }

    /// Configured worker count.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }
}

/// One recorded per-run failure.
#[derive(Debug)]
pub struct RunFailure {
    /// Index of the failed run in the profile list.
    pub index: usize,
    /// What went wrong.
    pub error: DispersionError,
}

/// What a finished batch produced.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successful run results, ordered by run index.
    pub results: Vec<RunResult>,
    /// Recorded run failures, ordered by run index.
    pub failures: Vec<RunFailure>,
    /// Runs never attempted because the batch was cancelled.
    pub skipped: usize,
    /// Wall time for the whole batch.
    pub elapsed: Duration,
}

impl BatchOutcome {
    /// Number of runs that landed successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    /// Number of recorded run failures.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether the batch stopped before attempting every run.
    #[must_use]
    pub const fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }
}

/// Work-stealing batch executor for dispersion runs.
///
/// Flight durations vary run to run, so tasks sit in a global queue and
/// idle workers steal from busy ones instead of waiting on a static
/// partition.
#[derive(Debug, Default)]
pub struct DispersionBatch {
    config: BatchConfig,
}

impl DispersionBatch {
    /// Create a batch executor with the given policy.
    #[must_use]
    pub const fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Fly every profile and collect per-run outcomes.
    ///
    /// `make_engine` is called once per worker thread; each worker loads
    /// the design into its own engine instance and then drains tasks. Run
    /// failures (engine errors, timeouts) are recorded against their run
    /// index; under the fail-fast policy the first one also cancels the
    /// remaining runs. Every other error aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when engine construction or design
    /// loading fails on any worker, when the profile list is empty, or,
    /// in fail-fast mode, the first recorded run failure.
    pub fn execute<E, F>(
        &self,
        design_reference: &Path,
        profiles: &[WindProfile],
        make_engine: F,
    ) -> DispersionResult<BatchOutcome>
    where
        E: FlightEngine,
        F: Fn(usize) -> DispersionResult<E> + Sync,
    {
        if profiles.is_empty() {
            return Err(DispersionError::invalid_request(
                "no wind profiles to fly; sample at least one",
            ));
        }

        let started = Instant::now();
        let worker_count = self.config.workers.min(profiles.len()).max(1);

        tracing::info!(
            runs = profiles.len(),
            workers = worker_count,
            "dispersion batch started"
        );

        // Global queue of run indices into the shared profile slice
        let injector: Injector<usize> = Injector::new();
        for index in 0..profiles.len() {
            injector.push(index);
        }

        let locals: Vec<Worker<usize>> = (0..worker_count).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<Stealer<usize>> = locals.iter().map(Worker::stealer).collect();

        let recorded: Mutex<Vec<(usize, DispersionResult<RunResult>)>> =
            Mutex::new(Vec::with_capacity(profiles.len()));
        let abort: Mutex<Option<DispersionError>> = Mutex::new(None);
        let cancelled = AtomicBool::new(false);

        std::thread::scope(|s| {
            for (worker_id, local) in locals.into_iter().enumerate() {
                let injector = &injector;
                let stealers = &stealers;
                let recorded = &recorded;
                let abort = &abort;
                let cancelled = &cancelled;
                let make_engine = &make_engine;
                let config = self.config;

                s.spawn(move || {
                    let runner = make_engine(worker_id)
                        .and_then(|engine| SimulationRunner::new(engine, design_reference));
                    let mut runner = match runner {
                        Ok(runner) => match config.run_timeout {
                            Some(limit) => runner.with_timeout(limit),
                            None => runner,
                        },
                        Err(error) => {
                            tracing::error!(worker = worker_id, %error, "worker setup failed");
                            cancelled.store(true, Ordering::Relaxed);
                            if let Ok(mut slot) = abort.lock() {
                                slot.get_or_insert(error);
                            }
                            return;
                        }
                    };

                    loop {
                        if cancelled.load(Ordering::Relaxed) {
                            break;
                        }

                        let task = local
                            .pop()
                            .or_else(|| loop {
                                match injector.steal() {
                                    Steal::Success(index) => break Some(index),
                                    Steal::Empty => break None,
                                    Steal::Retry => {}
                                }
                            })
                            .or_else(|| {
                                for offset in 0..stealers.len() {
                                    let victim = (worker_id + offset + 1) % stealers.len();
                                    loop {
                                        match stealers[victim].steal() {
                                            Steal::Success(index) => return Some(index),
                                            Steal::Empty => break,
                                            Steal::Retry => {}
                                        }
                                    }
                                }
                                None
                            });

                        let Some(index) = task else { break };

                        match runner.fly(&profiles[index]) {
                            Ok(result) => {
                                if let Ok(mut guard) = recorded.lock() {
                                    guard.push((index, Ok(result)));
                                }
                            }
                            Err(error) if error.is_run_failure() => {
                                tracing::warn!(run = index, %error, "flight run failed");
                                if !config.continue_on_failure {
                                    cancelled.store(true, Ordering::Relaxed);
                                }
                                if let Ok(mut guard) = recorded.lock() {
                                    guard.push((index, Err(error)));
                                }
                            }
                            Err(error) => {
                                tracing::error!(run = index, %error, "batch aborted");
                                cancelled.store(true, Ordering::Relaxed);
                                if let Ok(mut slot) = abort.lock() {
                                    slot.get_or_insert(error);
                                }
                                break;
                            }
                        }
                    }
                });
            }
        });

        if let Some(error) = abort.into_inner().unwrap_or_default() {
            return Err(error);
        }

        let mut recorded = recorded.into_inner().unwrap_or_default();
        recorded.sort_by_key(|(index, _)| *index);

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (index, outcome) in recorded {
            match outcome {
                Ok(result) => results.push(result),
                Err(error) => failures.push(RunFailure { index, error }),
            }
        }

        if !self.config.continue_on_failure {
            if let Some(first) = failures.into_iter().next() {
                return Err(first.error);
            }
            let outcome = BatchOutcome {
                skipped: profiles.len() - results.len(),
                results,
                failures: Vec::new(),
                elapsed: started.elapsed(),
            };
            return Ok(outcome);
        }

        let outcome = BatchOutcome {
            skipped: profiles.len() - results.len() - failures.len(),
            results,
            failures,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            skipped = outcome.skipped,
            elapsed = ?outcome.elapsed,
            "dispersion batch finished"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;
    use std::path::PathBuf;

    use crate::flight::{FlightTelemetry, GeoPosition};
    use crate::wind::WindLevel;

    use super::*;

    const LAUNCH: GeoPosition = GeoPosition {
        latitude_deg: 40.0,
        longitude_deg: -3.0,
    };

    fn profile(speed: f64) -> WindProfile {
        WindProfile {
            levels: vec![WindLevel {
                altitude_m: 1000.0,
                speed,
                heading_deg: 270.0,
                deviation: 0.0,
            }],
        }
    }

    fn profiles(count: usize) -> Vec<WindProfile> {
        (0..count).map(|i| profile(i as f64)).collect()
    }

    /// Deterministic engine: lands `speed` meters due north of the launch
    /// site and reaches an apogee of 100 + `speed` meters.
    struct StubEngine {
        fail_at_or_above: Option<f64>,
        delay: Option<Duration>,
    }

    struct StubDesign {
        reference: PathBuf,
        wind: Option<WindProfile>,
    }

    impl StubEngine {
        const fn reliable() -> Self {
            Self {
                fail_at_or_above: None,
                delay: None,
            }
        }
    }

    impl FlightEngine for StubEngine {
        type Design = StubDesign;

        fn load_design(&mut self, reference: &Path) -> DispersionResult<Self::Design> {
            if reference.extension().is_none() {
                return Err(DispersionError::design_load(format!(
                    "not a design archive: {}",
                    reference.display()
                )));
            }
            Ok(StubDesign {
                reference: reference.to_path_buf(),
                wind: None,
            })
        }

        fn configure_wind(
            &mut self,
            design: &mut Self::Design,
            profile: &WindProfile,
        ) -> DispersionResult<()> {
            design.wind = Some(profile.clone());
            Ok(())
        }

        fn run(&mut self, design: &mut Self::Design) -> DispersionResult<FlightTelemetry> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            let speed = design
                .wind
                .as_ref()
                .and_then(|p| p.levels.first())
                .map(|l| l.speed)
                .ok_or_else(|| DispersionError::engine("wind never configured"))?;
            if self.fail_at_or_above.is_some_and(|limit| speed >= limit) {
                return Err(DispersionError::engine(format!(
                    "solver diverged under {speed} m/s wind"
                )));
            }
            assert!(design.reference.extension().is_some());
            Ok(FlightTelemetry {
                altitude_m: vec![0.0, 100.0 + speed, 12.0],
                landing: GeoPosition {
                    latitude_deg: LAUNCH.latitude_deg
                        + speed / crate::flight::geometry::METERS_PER_DEGREE_LATITUDE,
                    longitude_deg: LAUNCH.longitude_deg,
                },
                launch_site: LAUNCH,
            })
        }
    }

    fn design_path() -> PathBuf {
        PathBuf::from("designs/dispersion-test.ork")
    }

    #[test]
    fn test_runner_single_flight() {
        let mut runner = SimulationRunner::new(StubEngine::reliable(), &design_path()).unwrap();
        let result = runner.fly(&profile(7.0)).unwrap();

        assert!((result.range_m - 7.0).abs() < 1e-9);
        assert!((result.bearing_rad - FRAC_PI_2).abs() < 1e-12);
        assert!((result.apogee_m - 107.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_runner_reuses_loaded_design() {
        let mut runner = SimulationRunner::new(StubEngine::reliable(), &design_path()).unwrap();
        let first = runner.fly(&profile(1.0)).unwrap();
        let second = runner.fly(&profile(2.0)).unwrap();
        assert!(second.range_m > first.range_m);
    }

    #[test]
    fn test_runner_rejects_bad_design() {
        let err = SimulationRunner::new(StubEngine::reliable(), Path::new("no-extension"));
        assert!(matches!(err, Err(DispersionError::DesignLoad { .. })));
    }

    #[test]
    fn test_runner_timeout() {
        let engine = StubEngine {
            fail_at_or_above: None,
            delay: Some(Duration::from_millis(30)),
        };
        let mut runner = SimulationRunner::new(engine, &design_path())
            .unwrap()
            .with_timeout(Duration::from_millis(1));

        let err = runner.fly(&profile(1.0));
        match err {
            Err(DispersionError::Timeout {
                elapsed_ms,
                limit_ms,
            }) => {
                assert!(elapsed_ms >= limit_ms);
                assert_eq!(limit_ms, 1);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_executes_all_in_index_order() {
        let batch = DispersionBatch::new(BatchConfig::new().with_workers(4));
        let outcome = batch
            .execute(&design_path(), &profiles(20), |_| Ok(StubEngine::reliable()))
            .unwrap();

        assert_eq!(outcome.succeeded(), 20);
        assert_eq!(outcome.failed(), 0);
        assert_eq!(outcome.skipped, 0);
        assert!(!outcome.was_cancelled());

        // The stub maps run index to range, so index order is range order
        for (i, result) in outcome.results.iter().enumerate() {
            assert!((result.range_m - i as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_batch_records_failures_and_continues() {
        let batch = DispersionBatch::new(BatchConfig::new().with_workers(3));
        let outcome = batch
            .execute(&design_path(), &profiles(10), |_| {
                Ok(StubEngine {
                    fail_at_or_above: Some(8.0),
                    delay: None,
                })
            })
            .unwrap();

        assert_eq!(outcome.succeeded(), 8);
        assert_eq!(outcome.failed(), 2);
        assert_eq!(outcome.skipped, 0);

        let failed_indices: Vec<usize> = outcome.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed_indices, vec![8, 9]);
        for failure in &outcome.failures {
            assert!(failure.error.is_run_failure());
        }
    }

    #[test]
    fn test_batch_fail_fast_returns_run_error() {
        let config = BatchConfig::new()
            .with_workers(2)
            .with_continue_on_failure(false);
        let batch = DispersionBatch::new(config);

        let err = batch.execute(&design_path(), &profiles(50), |_| {
            Ok(StubEngine {
                fail_at_or_above: Some(0.0),
                delay: None,
            })
        });
        assert!(matches!(err, Err(DispersionError::Engine { .. })));
    }

    #[test]
    fn test_batch_aborts_on_design_load_failure() {
        let batch = DispersionBatch::new(BatchConfig::new().with_workers(2));
        let err = batch.execute(Path::new("no-extension"), &profiles(5), |_| {
            Ok(StubEngine::reliable())
        });
        // Design-load failure is not a run failure, so the permissive
        // policy still aborts
        assert!(matches!(err, Err(DispersionError::DesignLoad { .. })));
    }

    #[test]
    fn test_batch_aborts_on_engine_construction_failure() {
        let batch = DispersionBatch::new(BatchConfig::new().with_workers(2));
        let err = batch.execute(&design_path(), &profiles(5), |worker| {
            if worker == 0 {
                Err(DispersionError::config("engine binary missing"))
            } else {
                Ok(StubEngine::reliable())
            }
        });
        assert!(matches!(err, Err(DispersionError::Config { .. })));
    }

    #[test]
    fn test_batch_rejects_empty_profiles() {
        let batch = DispersionBatch::new(BatchConfig::new());
        let err = batch.execute(&design_path(), &[], |_| Ok(StubEngine::reliable()));
        assert!(matches!(err, Err(DispersionError::InvalidRequest { .. })));
    }

    #[test]
    fn test_batch_timeout_recorded_per_run() {
        let config = BatchConfig::new()
            .with_workers(2)
            .with_run_timeout(Duration::from_millis(1));
        let batch = DispersionBatch::new(config);
        let outcome = batch
            .execute(&design_path(), &profiles(4), |_| {
                Ok(StubEngine {
                    fail_at_or_above: None,
                    delay: Some(Duration::from_millis(20)),
                })
            })
            .unwrap();

        assert_eq!(outcome.succeeded(), 0);
        assert_eq!(outcome.failed(), 4);
        for failure in &outcome.failures {
            assert!(matches!(failure.error, DispersionError::Timeout { .. }));
        }
    }

    #[test]
    fn test_batch_worker_count_invariance() {
        let run = |workers: usize| {
            DispersionBatch::new(BatchConfig::new().with_workers(workers))
                .execute(&design_path(), &profiles(32), |_| {
                    Ok(StubEngine::reliable())
                })
                .unwrap()
        };

        let serial = run(1);
        let parallel = run(8);

        assert_eq!(serial.results, parallel.results);
    }

    #[test]
    fn test_batch_config_clamps_zero_workers() {
        let config = BatchConfig::new().with_workers(0);
        assert_eq!(config.workers(), 1);
    }
}
