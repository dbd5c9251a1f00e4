use std::path::{Path, PathBuf};

use dispersim::prelude::*;

fn dataset(days: u32) -> WindDatabase {
    let entries: Vec<String> = (1..=days)
        .map(|day| {
            format!(
                r#"{{"datetime": "2022-03-{day:02}T06:00:00Z", "AM": {{"data": [{{"altitude": 0.0, "wind": {day}.5, "heading": 200.0}}]}}}}"#
            )
        })
        .collect();
    let json = format!("[{}]", entries.join(","));
    WindDatabase::from_json_str(&json, "AM").expect("dataset")
}

fn window(days: u32) -> DateRange {
    let start = chrono::NaiveDate::from_ymd_opt(2022, 3, 1).expect("date");
    let end = chrono::NaiveDate::from_ymd_opt(2022, 3, days).expect("date");
    DateRange::new(start, end)
}

// H0: Different master seeds produce identical wind samples
// Falsification: Random-regime sampling with seeds 42, 43, 44; compare draws
#[test]
fn h0_1_different_seeds_produce_different_samples() {
    let db = dataset(28);
    let sampler = WindSampler::new(&db, 0.0);
    let seeds = [42, 43, 44];

    let mut outputs = Vec::new();
    for seed in seeds {
        let mut rng = DispersionRng::new(seed);
        // 5 runs over 28 days selects the random regime
        let profiles = sampler.sample(&window(28), 5, &mut rng).expect("sample");
        outputs.push(profiles);
    }

    assert_ne!(
        outputs[0], outputs[1],
        "Seed 42 and 43 produced identical samples"
    );
    assert_ne!(
        outputs[1], outputs[2],
        "Seed 43 and 44 produced identical samples"
    );
    assert_ne!(
        outputs[0], outputs[2],
        "Seed 42 and 44 produced identical samples"
    );
}

// H0: Same seed produces different samples across runs
// Falsification: Run 100 iterations with seed=42; compare every draw
#[test]
fn h0_2_same_seed_produces_identical_samples() {
    let db = dataset(28);
    let sampler = WindSampler::new(&db, 0.0);
    let mut first: Vec<WindProfile> = Vec::new();

    for i in 0..100 {
        let mut rng = DispersionRng::new(42);
        let profiles = sampler.sample(&window(28), 9, &mut rng).expect("sample");

        if i == 0 {
            first = profiles;
        } else {
            assert_eq!(profiles, first, "Run {i} produced different samples");
        }
    }
}

// H0: Sampling from another thread changes the draws
// Falsification: Sample on 8 threads with the same seed; compare
#[test]
fn h0_3_thread_invariant_sampling() {
    use std::thread;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                let db = dataset(28);
                let sampler = WindSampler::new(&db, 0.0);
                let mut rng = DispersionRng::new(42);
                let profiles = sampler.sample(&window(28), 5, &mut rng).expect("sample");
                format!("{profiles:?}")
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.join().expect("join"));
    }

    for (i, result) in results.iter().enumerate().skip(1) {
        assert_eq!(&results[0], result, "Thread {i} produced different draws");
    }
}

// H0: Worker count changes batch results
// Falsification: Fly the same profiles on 1 and 8 workers; compare by index
#[test]
fn h0_4_worker_count_invariance() {
    struct NorthEngine;
    struct NorthDesign;

    impl FlightEngine for NorthEngine {
        type Design = NorthDesign;

        fn load_design(&mut self, _reference: &Path) -> DispersionResult<Self::Design> {
            Ok(NorthDesign)
        }

        fn configure_wind(
            &mut self,
            _design: &mut Self::Design,
            _profile: &WindProfile,
        ) -> DispersionResult<()> {
            Ok(())
        }

        fn run(&mut self, _design: &mut Self::Design) -> DispersionResult<FlightTelemetry> {
            Ok(FlightTelemetry {
                altitude_m: vec![0.0, 450.0, 0.0],
                landing: GeoPosition {
                    latitude_deg: 40.001,
                    longitude_deg: -3.0,
                },
                launch_site: GeoPosition {
                    latitude_deg: 40.0,
                    longitude_deg: -3.0,
                },
            })
        }
    }

    let db = dataset(4);
    let sampler = WindSampler::new(&db, 0.0);
    let mut rng = DispersionRng::new(42);
    let profiles = sampler.sample(&window(4), 32, &mut rng).expect("sample");

    let fly = |workers: usize| {
        DispersionBatch::new(BatchConfig::new().with_workers(workers))
            .execute(&PathBuf::from("designs/qa.ork"), &profiles, |_| {
                Ok(NorthEngine)
            })
            .expect("batch")
            .results
    };

    let serial = fly(1);
    let parallel = fly(8);
    assert_eq!(serial, parallel, "Worker count changed batch results");
}

// H0: Partitioned RNG streams collide
// Falsification: Draw from 4 partitions of one master seed; compare pairwise
#[test]
fn h0_6_partition_stream_independence() {
    let mut master = DispersionRng::new(42);
    let mut partitions = master.partition(4);

    let draws: Vec<Vec<u64>> = partitions
        .iter_mut()
        .map(|p| (0..16).map(|_| p.gen_u64()).collect())
        .collect();

    for i in 0..draws.len() {
        for j in (i + 1)..draws.len() {
            assert_ne!(draws[i], draws[j], "Partitions {i} and {j} collided");
        }
    }
}

// H0: Some day/count combination breaks the exact-count guarantee
// Falsification: Sweep both regimes and off-by-one boundaries
#[test]
fn h0_7_sample_count_exact_everywhere() {
    let db = dataset(28);
    let sampler = WindSampler::new(&db, 0.0);

    for days in [1, 2, 3, 7, 28] {
        for count in [1, 2, 3, 7, 10, 29, 100] {
            let mut rng = DispersionRng::new(42);
            let profiles = sampler
                .sample(&window(days), count, &mut rng)
                .expect("sample");
            assert_eq!(
                profiles.len(),
                count,
                "days={days} count={count} produced {} profiles",
                profiles.len()
            );
        }
    }
}

// H0: Summary values depend on run insertion order
// Falsification: Reverse the results and compare the summaries
#[test]
fn h0_9_summary_order_invariance() {
    let results: Vec<RunResult> = (1..=40)
        .map(|i| RunResult {
            range_m: f64::from(i) * 13.25,
            bearing_rad: f64::from(i) * 0.11 - 2.0,
            apogee_m: 900.0 + f64::from(i),
        })
        .collect();
    let reversed: Vec<RunResult> = results.iter().rev().copied().collect();

    let summarize = |runs: &[RunResult]| {
        let mut stats = LandingStatistics::with_default_levels();
        stats.add_all(runs);
        stats.summary().expect("summary")
    };

    let forward = summarize(&results);
    let backward = summarize(&reversed);

    assert_eq!(forward.samples, backward.samples);
    assert!((forward.mean_range_m - backward.mean_range_m).abs() < 1e-9);
    assert!((forward.std_range_m - backward.std_range_m).abs() < 1e-9);
    assert!((forward.mean_bearing_rad - backward.mean_bearing_rad).abs() < 1e-12);
    assert!((forward.mean_apogee_m - backward.mean_apogee_m).abs() < 1e-9);
}
