//! Benchmark engine.
//!
//! - [`matrix`]: expands files × codecs × levels × iterations into jobs
//! - [`runner`]: [`Runner`] drains the jobs on a worker pool
//! - [`result`]: [`BenchmarkResult`] and its derived metrics
//! - [`sink`]: append-only CSV stream and JSON snapshot
//! - [`summary`]: per (codec, level) averages printed after a run
//!
//! Typical call sequence: `Runner::new` → `Runner::run` →
//! `Runner::write_snapshot` → `summary::summarize(&runner.results())`.

pub mod matrix;
pub mod result;
pub mod runner;
pub mod sink;
pub mod summary;

pub use matrix::BenchmarkJob;
pub use result::BenchmarkResult;
pub use runner::{RunSummary, Runner};
pub use sink::CsvSink;
