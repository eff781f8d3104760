// Integration tests for bench/runner.rs: Runner construction and job execution
//
// Coverage:
//   - single-threaded codec, 1 file, 9 levels, 2 workers: 9 results, 1/1 threads
//   - stdout-mode codec round trip is verified
//   - threading-capable codec keeps the configured thread counts
//   - skip_decompression leaves decompression fields unset
//   - verify off: decompression measured, verified stays false
//   - corrupted decompression output is never verified
//   - one damaged byte in the compressed artifact is never verified
//   - compression failure, decompression failure and zero-length input
//     produce no result
//   - a missing input fails its jobs, other files still run
//   - unknown codec / no available codec are fatal at construction
//   - scratch directory is empty after a run
//   - iterations multiply the result count, run ids are unique
//   - JSON snapshot holds every result
//   - shared base names in different directories do not collide
//   - the per-process deadline kills a hung compressor

#![cfg(unix)]

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use compstat::bench::{BenchmarkResult, Runner};
use compstat::BenchError;
use tempfile::TempDir;

use crate::support::{self, config, csv_lines, registry, scratch_entries, write_input};

// ── Matrix execution ──────────────────────────────────────────────────────────

#[test]
fn single_threaded_codec_runs_every_level_once() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 64 * 1024);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["copy"]);
    cfg.parallelism = 2;

    let runner = Runner::new(cfg, &registry).unwrap();
    let summary = runner.run().unwrap();
    assert_eq!(summary.jobs, 9);
    assert_eq!(summary.completed, 9);
    assert_eq!(summary.failed, 0);

    let results = runner.results();
    assert_eq!(results.len(), 9);
    let mut levels: Vec<i32> = results.iter().map(|r| r.level).collect();
    levels.sort_unstable();
    assert_eq!(levels, (1..=9).collect::<Vec<_>>());
    for r in &results {
        assert_eq!((r.compress_threads, r.decompress_threads), (1, 1));
        assert_eq!(r.algorithm, "copy");
        assert_eq!(r.uncompressed_bytes, 64 * 1024);
        assert_eq!(r.compressed_bytes, 64 * 1024);
        assert_eq!(r.compression_ratio, 1.0);
        assert!(r.verified, "lossless round trip must verify: {r:?}");
    }

    // header + one row per job
    assert_eq!(csv_lines(&dir.path().join("results.csv")).len(), 10);
}

#[test]
fn stdout_mode_codec_round_trip_is_verified() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 10_000);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["cat"]), &registry).unwrap();
    runner.run().unwrap();

    let results = runner.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].compressed_bytes, 10_000);
    assert!(results[0].verified);
}

#[test]
fn threading_codec_keeps_configured_threads() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 1024);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["cat"]);
    cfg.compress_threads = 6;
    cfg.decompress_threads = 3;
    let runner = Runner::new(cfg, &registry).unwrap();
    runner.run().unwrap();

    let r = &runner.results()[0];
    assert_eq!((r.compress_threads, r.decompress_threads), (6, 3));
}

// ── Decompression and verification ────────────────────────────────────────────

#[test]
fn skip_decompression_leaves_decompression_unset() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 4096);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["cat"]);
    cfg.skip_decompression = true;
    let runner = Runner::new(cfg, &registry).unwrap();
    runner.run().unwrap();

    let r = &runner.results()[0];
    assert_eq!(r.decompression_time_s, 0.0);
    assert_eq!(r.decompression_speed_mbs, None);
    assert_eq!(r.decompression_max_rss_mb, 0.0);
    assert!(!r.verified);
    assert!(r.compression_time_s > 0.0);
}

#[test]
fn verification_off_still_measures_decompression() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 4096);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["cat"]);
    cfg.verify = false;
    let runner = Runner::new(cfg, &registry).unwrap();
    runner.run().unwrap();

    let r = &runner.results()[0];
    assert!(r.decompression_time_s > 0.0);
    assert!(!r.verified);
}

#[test]
fn corrupted_output_is_not_verified() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 4096);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["corrupt"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.completed, 1);
    let r = &runner.results()[0];
    assert!(r.decompression_time_s > 0.0);
    assert!(!r.verified);
}

#[test]
fn damaged_artifact_byte_is_not_verified() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 4096);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["flipbyte"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.completed, 1);
    let r = &runner.results()[0];
    assert_eq!(r.compressed_bytes, 4096);
    assert!(!r.verified);
}

#[test]
fn damaged_lz4_frame_fails_or_is_not_verified() {
    if compstat::codec::resolve_executable(Path::new("lz4")).is_none() {
        eprintln!("lz4 not installed, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 64 * 1024);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["lz4flip"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.jobs, 1);
    let results = runner.results();
    assert!(
        summary.failed == 1 || results.iter().all(|r| !r.verified),
        "{summary:?} {results:?}"
    );
    assert!(results.iter().all(|r| !r.verified));
}

#[test]
fn decompression_failure_drops_the_job() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 4096);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["brokendec"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.completed, 0);
    assert_eq!(summary.failed, 1);
    assert!(runner.results().is_empty());
    assert_eq!(csv_lines(&dir.path().join("results.csv")).len(), 1);
}

// ── Failing jobs ──────────────────────────────────────────────────────────────

#[test]
fn compression_failure_produces_no_result() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 4096);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["failing"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.completed, 0);
    assert!(runner.results().is_empty());
    assert_eq!(csv_lines(&dir.path().join("results.csv")).len(), 1);
}

#[test]
fn zero_length_input_produces_no_result() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "empty.bin", 0);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["cat"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(runner.result_count(), 0);
}

#[test]
fn missing_input_does_not_stop_other_files() {
    let dir = TempDir::new().unwrap();
    let good = write_input(dir.path(), "good.bin", 2048);
    let gone = dir.path().join("gone.bin");
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![gone, good.clone()], &["cat"]), &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.jobs, 2);
    assert_eq!(summary.failed, 1);
    let results = runner.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].file_path, good.display().to_string());
}

#[test]
fn hung_compressor_is_killed_at_deadline() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 1024);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["hang"]);
    cfg.timeout = Some(Duration::from_millis(200));
    let runner = Runner::new(cfg, &registry).unwrap();

    let start = Instant::now();
    let summary = runner.run().unwrap();
    assert!(start.elapsed() < Duration::from_secs(8));
    assert_eq!(summary.failed, 1);
}

// ── Construction errors ───────────────────────────────────────────────────────

#[test]
fn unknown_codec_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 16);
    let registry = registry();
    let err = Runner::new(config(&dir, vec![input], &["copy", "snappy"]), &registry)
        .err()
        .unwrap();
    assert!(matches!(err, BenchError::UnknownCodec(ref n) if n == "snappy"), "{err}");
}

#[test]
fn only_missing_codecs_is_no_codecs_available() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 16);
    let registry = registry();
    let err = Runner::new(config(&dir, vec![input], &["missing"]), &registry)
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "no codecs available");
}

#[test]
fn missing_codec_is_skipped_when_others_remain() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 16);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["missing", "cat"]), &registry).unwrap();
    let names: Vec<&str> = runner.codecs().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cat"]);
}

#[test]
fn invalid_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 16);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["cat"]);
    cfg.parallelism = 0;
    let err = Runner::new(cfg, &registry).err().unwrap();
    assert!(matches!(err, BenchError::InvalidConfig { parameter: "parallelism", .. }));
}

// ── Scratch files, iterations, snapshot ───────────────────────────────────────

#[test]
fn scratch_directory_is_empty_after_run() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 8192);
    let registry = registry();
    let cfg = config(&dir, vec![input], &["copy", "cat", "corrupt", "brokendec", "failing"]);
    let scratch = cfg.scratch_dir.clone();
    let runner = Runner::new(cfg, &registry).unwrap();
    runner.run().unwrap();

    assert!(scratch.is_dir());
    assert_eq!(scratch_entries(&scratch), 0);
}

#[test]
fn iterations_multiply_results_with_unique_run_ids() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 1024);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["copy", "cat"]);
    cfg.iterations = 3;
    cfg.parallelism = 4;
    let runner = Runner::new(cfg, &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.jobs, (9 + 1) * 3);
    let results = runner.results();
    assert_eq!(results.len(), 30);
    let ids: HashSet<&str> = results.iter().map(|r| r.run_id.as_str()).collect();
    assert_eq!(ids.len(), 30);
    let keys: HashSet<(&str, i32, u32)> = results
        .iter()
        .map(|r| (r.algorithm.as_str(), r.level, r.iteration))
        .collect();
    assert_eq!(keys.len(), 30);
}

#[test]
fn snapshot_holds_every_result() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 1024);
    let registry = registry();
    let mut cfg = config(&dir, vec![input], &["copy"]);
    let json = dir.path().join("results.json");
    cfg.output_json = Some(json.clone());
    let runner = Runner::new(cfg, &registry).unwrap();
    runner.run().unwrap();
    runner.write_snapshot().unwrap();

    let parsed: Vec<BenchmarkResult> =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed.len(), 9);
    let mut expected = runner.results();
    let mut parsed = parsed;
    expected.sort_by_key(|r| r.level);
    parsed.sort_by_key(|r| r.level);
    assert_eq!(parsed, expected);
}

#[test]
fn no_snapshot_without_json_path() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 1024);
    let registry = registry();
    let runner = Runner::new(config(&dir, vec![input], &["cat"]), &registry).unwrap();
    runner.run().unwrap();
    runner.write_snapshot().unwrap();
    assert!(!dir.path().join("results.json").exists());
}

#[test]
fn shared_base_names_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let a = support::write_input(dir.path(), "x/data.bin", 3000);
    let b = support::write_input(dir.path(), "y/data.bin", 5000);
    let registry = registry();
    let mut cfg = config(&dir, vec![a, b], &["copy"]);
    cfg.parallelism = 4;
    let runner = Runner::new(cfg, &registry).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.completed, 18);
    let results = runner.results();
    assert!(results.iter().all(|r| r.verified));
    assert_eq!(results.iter().filter(|r| r.uncompressed_bytes == 3000).count(), 9);
    assert_eq!(results.iter().filter(|r| r.uncompressed_bytes == 5000).count(), 9);
}

#[test]
fn second_run_appends_without_second_header() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.bin", 1024);
    let registry = registry();
    for _ in 0..2 {
        let runner = Runner::new(config(&dir, vec![input.clone()], &["cat"]), &registry).unwrap();
        runner.run().unwrap();
    }
    let lines = csv_lines(&dir.path().join("results.csv"));
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("run_id,algorithm,level"));
    assert!(!lines[2].starts_with("run_id"));
}
