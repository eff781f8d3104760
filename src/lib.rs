// compstat: benchmark harness for external compression tools

pub mod bench;
pub mod cli;
pub mod codec;
pub mod config;
pub mod digest;
pub mod display;
pub mod error;
pub mod exec;
pub mod pool;
pub mod util;

pub const COMPSTAT_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use bench::{BenchmarkResult, RunSummary, Runner};
pub use codec::{CodecDescriptor, CodecRegistry, OutputMode};
pub use config::RunConfig;
pub use error::{BenchError, JobError};
