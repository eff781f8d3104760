//! Command-line arguments for the `compstat` binary.
//!
//! [`Args`] is parsed with `clap` and then turned into a [`RunConfig`] by
//! [`Args::into_config`]. Environment overrides (`COMPSTAT_PARALLELISM`,
//! `COMPSTAT_TMPDIR`) apply only when the matching flag is absent.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};

use crate::codec::CodecRegistry;
use crate::config::{self, RunConfig, DEFAULT_ITERATIONS, DEFAULT_OUTPUT_CSV};
use crate::display::{DEFAULT_DISPLAY_LEVEL, MAX_DISPLAY_LEVEL};
use crate::util::{expand_inputs, resolve_threads};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "compstat",
    version,
    about = "Benchmark external compression tools across levels, threads and iterations"
)]
pub struct Args {
    /// Comma-separated input files; directories are walked recursively.
    #[arg(
        long,
        value_delimiter = ',',
        value_name = "FILES",
        required_unless_present = "list_codecs"
    )]
    pub files: Vec<PathBuf>,

    /// Comma-separated codec names (default: every registered codec).
    #[arg(long, value_delimiter = ',', value_name = "CODECS")]
    pub codecs: Vec<String>,

    /// Compression threads for threading-capable codecs (0 = CPU count).
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub compress_threads: usize,

    /// Decompression threads for threading-capable codecs (0 = CPU count).
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub decompress_threads: usize,

    /// Repetitions of every (file, codec, level) combination.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS, value_name = "N")]
    pub iterations: u32,

    /// Scratch directory for compressed and decompressed artifacts.
    #[arg(long, value_name = "DIR")]
    pub tmpdir: Option<PathBuf>,

    /// CSV file results are appended to.
    #[arg(long, default_value = DEFAULT_OUTPUT_CSV, value_name = "FILE")]
    pub output: PathBuf,

    /// Also write every result as a JSON array at the end of the run.
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Do not compare decompressed output against the input.
    #[arg(long)]
    pub no_verify: bool,

    /// Measure compression only.
    #[arg(long)]
    pub skip_decompression: bool,

    /// Number of jobs run concurrently.
    #[arg(long, value_name = "N")]
    pub parallelism: Option<usize>,

    /// Kill any compressor or decompressor running longer than this.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// List registered codecs and whether they are installed, then exit.
    #[arg(long)]
    pub list_codecs: bool,

    /// More output (repeatable).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less output (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    /// Display level implied by `-v` / `-q`.
    pub fn display_level(&self) -> u32 {
        let level = DEFAULT_DISPLAY_LEVEL + u32::from(self.verbose);
        level
            .saturating_sub(u32::from(self.quiet))
            .min(MAX_DISPLAY_LEVEL)
    }

    /// Builds the run configuration.
    ///
    /// Directories in `--files` are expanded; an empty `--codecs` selects
    /// every codec in `registry`. The result is not validated here.
    pub fn into_config(self, registry: &CodecRegistry) -> anyhow::Result<RunConfig> {
        let files = expand_inputs(&self.files).context("failed to expand input files")?;
        let codecs = if self.codecs.is_empty() {
            registry.all_names().into_iter().map(str::to_owned).collect()
        } else {
            self.codecs.iter().map(|c| c.trim().to_owned()).collect()
        };
        let scratch_dir = match self.tmpdir {
            Some(dir) => dir,
            None => config::default_scratch_dir(),
        };
        let parallelism = match self.parallelism {
            Some(n) => n,
            None => config::init_parallelism(),
        };

        Ok(RunConfig {
            files,
            codecs,
            compress_threads: resolve_threads(self.compress_threads),
            decompress_threads: resolve_threads(self.decompress_threads),
            iterations: self.iterations,
            scratch_dir,
            output_csv: self.output,
            output_json: self.json,
            verify: !self.no_verify,
            skip_decompression: self.skip_decompression,
            parallelism,
            timeout: self.timeout.map(Duration::from_secs),
        })
    }
}
