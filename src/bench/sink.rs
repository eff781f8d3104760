//! Result persistence: an append-only CSV stream and a JSON snapshot.
//!
//! The CSV stream is the durable record. Rows are appended as jobs complete
//! and flushed one by one, so an interrupted run keeps every finished row. The
//! header is written only when the destination is empty, which lets several
//! runs accumulate into one file.
//!
//! The JSON snapshot is a convenience export of the whole result set, written
//! once at the end of a run.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use csv::{Writer, WriterBuilder};

use super::result::BenchmarkResult;
use crate::error::{BenchError, Result};

/// CSV column names, in row order.
pub const CSV_COLUMNS: [&str; 17] = [
    "run_id",
    "algorithm",
    "level",
    "compress_threads",
    "decompress_threads",
    "file_path",
    "uncompressed_bytes",
    "compressed_bytes",
    "compression_ratio",
    "compression_time_s",
    "decompression_time_s",
    "compression_speed_mbs",
    "decompression_speed_mbs",
    "compression_max_rss_mb",
    "decompression_max_rss_mb",
    "verified",
    "iteration",
];

/// Thread-safe append-only CSV writer.
pub struct CsvSink {
    writer: Mutex<Writer<File>>,
}

impl CsvSink {
    /// Opens `path` for appending, creating it if needed, and writes the
    /// header row when the file is empty.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BenchError::setup(format!("failed to open {}", path.display()), e))?;
        let is_empty = file
            .metadata()
            .map_err(|e| BenchError::setup(format!("failed to stat {}", path.display()), e))?
            .len()
            == 0;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            writer.write_record(CSV_COLUMNS)?;
            writer
                .flush()
                .map_err(|e| BenchError::setup(format!("failed to write {}", path.display()), e))?;
        }
        Ok(CsvSink {
            writer: Mutex::new(writer),
        })
    }

    /// Appends one row and flushes it.
    pub fn append(&self, result: &BenchmarkResult) -> Result<()> {
        let row = csv_row(result);
        // A poisoned lock only means another writer panicked mid-row; the
        // writer itself is still usable.
        let mut writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        writer.write_record(&row)?;
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Formats `result` as CSV fields in [`CSV_COLUMNS`] order.
///
/// Undefined speeds are written as empty cells.
pub fn csv_row(result: &BenchmarkResult) -> [String; 17] {
    let speed = |v: Option<f64>| v.map(|s| format!("{s:.2}")).unwrap_or_default();
    [
        result.run_id.clone(),
        result.algorithm.clone(),
        result.level.to_string(),
        result.compress_threads.to_string(),
        result.decompress_threads.to_string(),
        result.file_path.clone(),
        result.uncompressed_bytes.to_string(),
        result.compressed_bytes.to_string(),
        format!("{:.4}", result.compression_ratio),
        format!("{:.3}", result.compression_time_s),
        format!("{:.3}", result.decompression_time_s),
        speed(result.compression_speed_mbs),
        speed(result.decompression_speed_mbs),
        format!("{:.2}", result.compression_max_rss_mb),
        format!("{:.2}", result.decompression_max_rss_mb),
        result.verified.to_string(),
        result.iteration.to_string(),
    ]
}

/// Writes every result to `path` as a pretty-printed JSON array, replacing
/// any previous content.
pub fn write_snapshot(path: &Path, results: &[BenchmarkResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results).map_err(|e| BenchError::Snapshot {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    fs::write(path, json).map_err(|source| BenchError::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}
