//! Benchmark result record and the metrics derived from raw measurements.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bytes per MB used for every throughput and memory figure (MiB).
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// `bytes / 1 MiB / seconds`, or `None` when `elapsed` is zero.
pub fn throughput_mbs(bytes: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        Some(bytes as f64 / BYTES_PER_MB / secs)
    } else {
        None
    }
}

/// `compressed / uncompressed`, or `None` for empty input.
pub fn compression_ratio(compressed: u64, uncompressed: u64) -> Option<f64> {
    if uncompressed == 0 {
        None
    } else {
        Some(compressed as f64 / uncompressed as f64)
    }
}

/// Peak RSS in MB, `0.0` when it was not measured.
pub fn rss_mb(max_rss_bytes: Option<u64>) -> f64 {
    max_rss_bytes.map_or(0.0, |b| b as f64 / BYTES_PER_MB)
}

/// One completed benchmark job.
///
/// Field order is the column order of the CSV stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub run_id: String,
    pub algorithm: String,
    pub level: i32,
    pub compress_threads: usize,
    pub decompress_threads: usize,
    pub file_path: String,
    pub uncompressed_bytes: u64,
    pub compressed_bytes: u64,
    pub compression_ratio: f64,
    pub compression_time_s: f64,
    pub decompression_time_s: f64,
    /// `None` when the compression time was too short to measure.
    pub compression_speed_mbs: Option<f64>,
    /// `None` when decompression was skipped or too short to measure.
    pub decompression_speed_mbs: Option<f64>,
    pub compression_max_rss_mb: f64,
    pub decompression_max_rss_mb: f64,
    pub verified: bool,
    pub iteration: u32,
}

/// Raw compression-phase measurements for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionSample {
    pub run_id: String,
    pub algorithm: String,
    pub level: i32,
    pub compress_threads: usize,
    pub decompress_threads: usize,
    pub file_path: String,
    pub iteration: u32,
    pub uncompressed_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
    pub max_rss_bytes: Option<u64>,
}

impl BenchmarkResult {
    /// Builds a result from the compression phase, deriving ratio and speed.
    ///
    /// Returns `None` for zero-length input: such a job has no defined ratio
    /// and must not produce a result.
    pub fn from_compression(sample: CompressionSample) -> Option<Self> {
        let ratio = compression_ratio(sample.compressed_bytes, sample.uncompressed_bytes)?;
        Some(BenchmarkResult {
            run_id: sample.run_id,
            algorithm: sample.algorithm,
            level: sample.level,
            compress_threads: sample.compress_threads,
            decompress_threads: sample.decompress_threads,
            file_path: sample.file_path,
            uncompressed_bytes: sample.uncompressed_bytes,
            compressed_bytes: sample.compressed_bytes,
            compression_ratio: ratio,
            compression_time_s: sample.elapsed.as_secs_f64(),
            decompression_time_s: 0.0,
            compression_speed_mbs: throughput_mbs(sample.uncompressed_bytes, sample.elapsed),
            decompression_speed_mbs: None,
            compression_max_rss_mb: rss_mb(sample.max_rss_bytes),
            decompression_max_rss_mb: 0.0,
            verified: false,
            iteration: sample.iteration,
        })
    }

    /// Records a successful decompression of this job's artifact.
    pub fn record_decompression(&mut self, elapsed: Duration, max_rss_bytes: Option<u64>) {
        self.decompression_time_s = elapsed.as_secs_f64();
        self.decompression_speed_mbs = throughput_mbs(self.uncompressed_bytes, elapsed);
        self.decompression_max_rss_mb = rss_mb(max_rss_bytes);
    }
}
