//! Run configuration: defaults, environment overrides and validation.
//!
//! [`RunConfig`] is built by the CLI (or directly by tests), validated once
//! with [`RunConfig::validate`], and then treated as immutable for the run.
//!
//! Two settings may come from the environment before flags are applied:
//!
//! | variable               | field         |
//! |------------------------|---------------|
//! | `COMPSTAT_PARALLELISM` | `parallelism` |
//! | `COMPSTAT_TMPDIR`      | `scratch_dir` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::displaylevel;
use crate::error::{BenchError, Result};

/// Default CSV destination.
pub const DEFAULT_OUTPUT_CSV: &str = "compstat_results.csv";

/// Directory created under the system temp dir when no scratch dir is given.
pub const SCRATCH_DIR_NAME: &str = "compstat_tmp";

pub const DEFAULT_ITERATIONS: u32 = 1;
pub const DEFAULT_PARALLELISM: usize = 1;

pub const ENV_PARALLELISM: &str = "COMPSTAT_PARALLELISM";
pub const ENV_TMPDIR: &str = "COMPSTAT_TMPDIR";

/// Everything the benchmark engine needs to know about one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Input files, in the order they should be enumerated.
    pub files: Vec<PathBuf>,
    /// Codec names, resolved against the registry in this order.
    pub codecs: Vec<String>,
    /// Threads passed to threading-capable codecs when compressing.
    pub compress_threads: usize,
    /// Threads passed to threading-capable codecs when decompressing.
    pub decompress_threads: usize,
    /// Repetitions of every (file, codec, level) combination.
    pub iterations: u32,
    /// Directory holding per-job compressed and decompressed artifacts.
    pub scratch_dir: PathBuf,
    /// Append-only CSV destination.
    pub output_csv: PathBuf,
    /// Optional full JSON snapshot written at the end of the run.
    pub output_json: Option<PathBuf>,
    /// Compare decompressed output against the input digest.
    pub verify: bool,
    /// Skip the decompression phase entirely.
    pub skip_decompression: bool,
    /// Number of jobs executed concurrently.
    pub parallelism: usize,
    /// Kill an external tool that runs longer than this.
    pub timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let cores = crate::util::count_cores();
        RunConfig {
            files: Vec::new(),
            codecs: Vec::new(),
            compress_threads: cores,
            decompress_threads: cores,
            iterations: DEFAULT_ITERATIONS,
            scratch_dir: default_scratch_dir(),
            output_csv: PathBuf::from(DEFAULT_OUTPUT_CSV),
            output_json: None,
            verify: true,
            skip_decompression: false,
            parallelism: DEFAULT_PARALLELISM,
            timeout: None,
        }
    }
}

impl RunConfig {
    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// Codec names are checked against the registry separately, when the
    /// runner resolves them.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(BenchError::invalid("files", "at least one input file is required"));
        }
        if self.codecs.is_empty() {
            return Err(BenchError::invalid("codecs", "at least one codec is required"));
        }
        if let Some(name) = self.codecs.iter().find(|c| c.trim().is_empty()) {
            return Err(BenchError::invalid(
                "codecs",
                format!("empty codec name in list ({name:?})"),
            ));
        }
        if self.iterations == 0 {
            return Err(BenchError::invalid("iterations", "must be at least 1"));
        }
        if self.parallelism == 0 {
            return Err(BenchError::invalid("parallelism", "must be at least 1"));
        }
        if self.compress_threads == 0 {
            return Err(BenchError::invalid("compress_threads", "must be at least 1"));
        }
        if self.decompress_threads == 0 {
            return Err(BenchError::invalid("decompress_threads", "must be at least 1"));
        }
        if self.scratch_dir.as_os_str().is_empty() {
            return Err(BenchError::invalid("scratch_dir", "must not be empty"));
        }
        if self.output_csv.as_os_str().is_empty() {
            return Err(BenchError::invalid("output_csv", "must not be empty"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(BenchError::invalid("timeout", "must be greater than zero"));
        }
        Ok(())
    }

    /// Verification needs a decompressed artifact to compare.
    pub fn verification_active(&self) -> bool {
        self.verify && !self.skip_decompression
    }
}

/// `<system temp>/compstat_tmp`, unless `COMPSTAT_TMPDIR` is set.
pub fn default_scratch_dir() -> PathBuf {
    scratch_dir_from(env::var_os(ENV_TMPDIR).map(PathBuf::from))
}

/// Testable core of [`default_scratch_dir`].
pub fn scratch_dir_from(env_val: Option<PathBuf>) -> PathBuf {
    match env_val {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => env::temp_dir().join(SCRATCH_DIR_NAME),
    }
}

/// Worker count from `COMPSTAT_PARALLELISM`, or [`DEFAULT_PARALLELISM`].
pub fn init_parallelism() -> usize {
    init_parallelism_from(env::var(ENV_PARALLELISM).ok().as_deref())
}

/// Testable core of [`init_parallelism`].
///
/// Values that are not a positive integer are ignored with a warning.
pub fn init_parallelism_from(env_val: Option<&str>) -> usize {
    if let Some(raw) = env_val {
        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => return n,
            _ => {
                displaylevel!(
                    2,
                    "Ignore environment variable setting {}={}: not a positive integer\n",
                    ENV_PARALLELISM,
                    raw
                );
            }
        }
    }
    DEFAULT_PARALLELISM
}
