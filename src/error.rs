//! Error taxonomy for a benchmark run.
//!
//! [`BenchError`] covers everything that aborts a run before (or instead of)
//! finishing it: bad configuration, setup failures, sink failures. Failures of
//! a single benchmark job are [`JobError`]s; they are logged by the worker that
//! hit them and never escape it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExecError;

/// Result type for run-level operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Fatal, run-level errors.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A configuration field is missing or out of range.
    #[error("invalid configuration: {parameter}: {reason}")]
    InvalidConfig {
        parameter: &'static str,
        reason: String,
    },

    /// A codec name that is not in the registry.
    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    /// Every requested codec was unknown to the host (executable not found).
    #[error("no codecs available")]
    NoCodecsAvailable,

    /// The job matrix would be empty.
    #[error("nothing to benchmark: {0}")]
    EmptyMatrix(&'static str),

    /// Scratch directory or result sink could not be prepared.
    #[error("{context}: {source}")]
    Setup {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The tabular result stream rejected a write.
    #[error("failed to write result row: {0}")]
    Sink(#[from] csv::Error),

    /// The JSON snapshot could not be written.
    #[error("failed to write snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The worker pool could not be started.
    #[error("worker pool: {0}")]
    Pool(String),
}

impl BenchError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        BenchError::InvalidConfig {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn setup(context: impl Into<String>, source: io::Error) -> Self {
        BenchError::Setup {
            context: context.into(),
            source,
        }
    }
}

/// Reasons a single benchmark job is abandoned.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to get file size of {}: {source}", path.display())]
    Size {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Zero-length input would make the ratio undefined.
    #[error("input {} is empty", .0.display())]
    EmptyInput(PathBuf),

    #[error("compression failed: {0}")]
    Compress(#[source] ExecError),

    #[error("decompression failed: {0}")]
    Decompress(#[source] ExecError),
}
