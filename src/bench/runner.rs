//! Benchmark orchestration.
//!
//! A [`Runner`] owns one validated run: the resolved codecs, the scratch
//! directory, the CSV sink and the in-memory result collection. [`Runner::run`]
//! hashes the inputs, expands the job matrix and drains it on a
//! [`WorkerPool`]. Each job compresses, optionally decompresses and verifies,
//! then removes its scratch files whatever the outcome.
//!
//! A failing job (unreadable input, failed compression or decompression) is
//! logged and dropped; it never stops the run. A digest mismatch or digest
//! error only leaves `verified` false. Only setup and sink failures are fatal.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::matrix::{self, BenchmarkJob};
use super::result::{BenchmarkResult, CompressionSample};
use super::sink::{self, CsvSink};
use crate::codec::{CodecDescriptor, CodecRegistry};
use crate::config::RunConfig;
use crate::digest::{self, Digest};
use crate::displaylevel;
use crate::error::{BenchError, JobError, Result};
use crate::exec::{self, Execution, ExecError};
use crate::pool::WorkerPool;
use crate::util::file_size;

/// Job counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub jobs: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct Runner<'r> {
    config: RunConfig,
    codecs: Vec<&'r CodecDescriptor>,
    sink: CsvSink,
    results: Mutex<Vec<BenchmarkResult>>,
}

impl<'r> Runner<'r> {
    /// Validates `config`, resolves its codecs against `registry`, creates the
    /// scratch directory and opens the CSV sink.
    pub fn new(config: RunConfig, registry: &'r CodecRegistry) -> Result<Self> {
        config.validate()?;
        let codecs = resolve_codecs(&config.codecs, registry)?;

        fs::create_dir_all(&config.scratch_dir).map_err(|e| {
            BenchError::setup(
                format!("failed to create tmpdir {}", config.scratch_dir.display()),
                e,
            )
        })?;
        let sink = CsvSink::open(&config.output_csv)?;

        displaylevel!(
            3,
            "Scratch directory: {}\nThreads: {} compress, {} decompress\n",
            config.scratch_dir.display(),
            config.compress_threads,
            config.decompress_threads
        );
        Ok(Runner {
            config,
            codecs,
            sink,
            results: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Codecs that will be benchmarked, in resolution order.
    pub fn codecs(&self) -> &[&'r CodecDescriptor] {
        &self.codecs
    }

    /// Runs every job and blocks until all of them are done.
    pub fn run(&self) -> Result<RunSummary> {
        let hashes = if self.config.verification_active() {
            digest::precompute(&self.config.files)
        } else {
            HashMap::new()
        };

        let jobs = matrix::build(&self.config.files, &self.codecs, self.config.iterations)?;
        let total = jobs.len();
        let pool = WorkerPool::new(self.config.parallelism)?;
        displaylevel!(
            3,
            "Running {} jobs on {} workers\n",
            total,
            pool.workers()
        );

        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let sink_error: Mutex<Option<BenchError>> = Mutex::new(None);

        pool.drain(jobs, |_, job| {
            displaylevel!(
                2,
                "[{}/{}] {} - {} level {}\n",
                job.iteration,
                self.config.iterations,
                job.label,
                job.codec.name,
                job.level
            );
            match self.run_job(&job, &hashes) {
                Ok(result) => {
                    if let Err(e) = self.record(result) {
                        displaylevel!(1, "Error: {}\n", e);
                        lock(&sink_error).get_or_insert(e);
                    }
                    completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    displaylevel!(1, "Error: {}: {}\n", describe(&job), e);
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        })?;

        if let Some(e) = sink_error.into_inner().unwrap_or_else(|p| p.into_inner()) {
            return Err(e);
        }
        Ok(RunSummary {
            jobs: total,
            completed: completed.into_inner(),
            failed: failed.into_inner(),
        })
    }

    /// Copy of every result recorded so far.
    pub fn results(&self) -> Vec<BenchmarkResult> {
        lock(&self.results).clone()
    }

    pub fn result_count(&self) -> usize {
        lock(&self.results).len()
    }

    /// Writes the JSON snapshot when one is configured.
    pub fn write_snapshot(&self) -> Result<()> {
        match &self.config.output_json {
            Some(path) => sink::write_snapshot(path, &self.results()),
            None => Ok(()),
        }
    }

    fn record(&self, result: BenchmarkResult) -> Result<()> {
        let appended = self.sink.append(&result);
        lock(&self.results).push(result);
        appended
    }

    fn run_job(
        &self,
        job: &BenchmarkJob<'_>,
        hashes: &HashMap<PathBuf, Digest>,
    ) -> std::result::Result<BenchmarkResult, JobError> {
        let codec = job.codec;
        let (c_threads, d_threads) = codec.effective_threads(
            self.config.compress_threads,
            self.config.decompress_threads,
        );
        let compressed = job.compressed_path(&self.config.scratch_dir);
        let decompressed = job.decompressed_path(&self.config.scratch_dir);
        let _scratch = ScratchFiles([compressed.as_path(), decompressed.as_path()]);

        let uncompressed_bytes = file_size(job.file).map_err(|source| JobError::Size {
            path: job.file.to_path_buf(),
            source,
        })?;
        if uncompressed_bytes == 0 {
            return Err(JobError::EmptyInput(job.file.to_path_buf()));
        }

        let args = codec.compress_command(job.level, c_threads, job.file, &compressed);
        let compression = self
            .execute(codec, &args, &compressed)
            .map_err(JobError::Compress)?;

        let compressed_bytes = file_size(&compressed).map_err(|source| JobError::Size {
            path: compressed.clone(),
            source,
        })?;

        let sample = CompressionSample {
            run_id: job.run_id(Utc::now().timestamp()),
            algorithm: codec.name.clone(),
            level: job.level,
            compress_threads: c_threads,
            decompress_threads: d_threads,
            file_path: job.file.display().to_string(),
            iteration: job.iteration,
            uncompressed_bytes,
            compressed_bytes,
            elapsed: compression.elapsed,
            max_rss_bytes: compression.max_rss_bytes,
        };
        let mut result = BenchmarkResult::from_compression(sample)
            .ok_or_else(|| JobError::EmptyInput(job.file.to_path_buf()))?;

        if self.config.skip_decompression {
            return Ok(result);
        }

        let args = codec.decompress_command(d_threads, &compressed, &decompressed);
        let decompression = self
            .execute(codec, &args, &decompressed)
            .map_err(JobError::Decompress)?;
        result.record_decompression(decompression.elapsed, decompression.max_rss_bytes);
        if self.config.verify {
            if let Some(expected) = hashes.get(job.file) {
                result.verified = verify(&decompressed, expected);
            }
        }
        Ok(result)
    }

    fn execute(
        &self,
        codec: &CodecDescriptor,
        args: &[std::ffi::OsString],
        output: &Path,
    ) -> std::result::Result<Execution, ExecError> {
        displaylevel!(4, "{}\n", exec::render_command(&codec.executable, args));
        exec::execute_with_deadline(
            &codec.executable,
            args,
            codec.redirect_target(output),
            self.config.timeout,
        )
    }
}

/// Looks up each requested codec, in order, skipping duplicates.
///
/// An unknown name is fatal. A known codec whose executable is missing is
/// skipped with a warning; if nothing is left the run cannot proceed.
pub fn resolve_codecs<'r>(
    names: &[String],
    registry: &'r CodecRegistry,
) -> Result<Vec<&'r CodecDescriptor>> {
    let mut resolved: Vec<&CodecDescriptor> = Vec::with_capacity(names.len());
    for name in names {
        let descriptor = registry.lookup(name.trim())?;
        if resolved.iter().any(|c| c.name == descriptor.name) {
            continue;
        }
        if !CodecRegistry::is_available(descriptor) {
            displaylevel!(
                2,
                "Warning: {} not found, skipping {}\n",
                descriptor.executable.display(),
                descriptor.name
            );
            continue;
        }
        resolved.push(descriptor);
    }
    if resolved.is_empty() {
        return Err(BenchError::NoCodecsAvailable);
    }
    Ok(resolved)
}

fn verify(decompressed: &Path, expected: &Digest) -> bool {
    match digest::digest_file(decompressed) {
        Ok(actual) => {
            displaylevel!(3, "{}: {}\n", decompressed.display(), actual);
            actual == *expected
        }
        Err(e) => {
            displaylevel!(1, "Error: cannot hash {}: {}\n", decompressed.display(), e);
            false
        }
    }
}

fn describe(job: &BenchmarkJob<'_>) -> String {
    format!(
        "{} {} level {} iteration {}",
        job.file.display(),
        job.codec.name,
        job.level,
        job.iteration
    )
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

// ── Scratch cleanup ───────────────────────────────────────────────────────────

/// Removes a job's scratch files when dropped, on every exit path.
struct ScratchFiles<'p>([&'p Path; 2]);

impl Drop for ScratchFiles<'_> {
    fn drop(&mut self) {
        for path in self.0 {
            remove_scratch(path);
        }
    }
}

fn remove_scratch(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => displaylevel!(4, "Cannot remove {}: {}\n", path.display(), e),
    }
}
