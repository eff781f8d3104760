//! Job matrix: every (file, codec, level, iteration) combination of a run.
//!
//! Enumeration is file-major, then codec (in resolved order), then level (in
//! descriptor order), then iteration `1..=n`. That order is reproducible but
//! is only the order jobs are queued in, not the order they complete.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::codec::CodecDescriptor;
use crate::error::{BenchError, Result};
use crate::util::base_name;

/// One unit of benchmark work.
#[derive(Debug, Clone)]
pub struct BenchmarkJob<'a> {
    pub file: &'a Path,
    /// File name used in scratch paths and run ids; unique per input file.
    pub label: String,
    pub codec: &'a CodecDescriptor,
    pub level: i32,
    /// 1-based.
    pub iteration: u32,
}

impl BenchmarkJob<'_> {
    /// Compressed artifact path: `<label>.<codec>.<level>.<iteration><ext>`.
    pub fn compressed_path(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(format!(
            "{}.{}.{}.{}{}",
            self.label, self.codec.name, self.level, self.iteration, self.codec.extension
        ))
    }

    /// Decompressed output path: `<label>.<codec>.<level>.<iteration>.out`.
    pub fn decompressed_path(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(format!(
            "{}.{}.{}.{}.out",
            self.label, self.codec.name, self.level, self.iteration
        ))
    }

    /// `<timestamp>_<label>_<codec>_<level>_<iteration>`.
    pub fn run_id(&self, timestamp: i64) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            timestamp, self.label, self.codec.name, self.level, self.iteration
        )
    }
}

/// File labels: the base name, prefixed with the file's position when two
/// inputs share a base name. Labels are unique across `files`.
pub fn file_labels(files: &[PathBuf]) -> Vec<String> {
    let names: Vec<String> = files.iter().map(|f| base_name(f)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    let mut used = HashSet::with_capacity(names.len());
    let mut labels = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let mut label = if counts[name.as_str()] > 1 {
            format!("{i}-{name}")
        } else {
            name.clone()
        };
        while !used.insert(label.clone()) {
            label = format!("{i}-{label}");
        }
        labels.push(label);
    }
    labels
}

/// Number of jobs [`build`] would produce.
pub fn job_count(files: usize, codecs: &[&CodecDescriptor], iterations: u32) -> usize {
    codecs
        .iter()
        .map(|c| files * c.levels.len() * iterations as usize)
        .sum()
}

/// Expand files × codecs × levels × iterations into the ordered job list.
pub fn build<'a>(
    files: &'a [PathBuf],
    codecs: &[&'a CodecDescriptor],
    iterations: u32,
) -> Result<Vec<BenchmarkJob<'a>>> {
    if files.is_empty() {
        return Err(BenchError::EmptyMatrix("no input files"));
    }
    if codecs.is_empty() {
        return Err(BenchError::EmptyMatrix("no available codecs"));
    }
    if iterations == 0 {
        return Err(BenchError::EmptyMatrix("iteration count is zero"));
    }

    let labels = file_labels(files);
    let mut jobs = Vec::with_capacity(job_count(files.len(), codecs, iterations));
    for (file, label) in files.iter().zip(labels) {
        for &codec in codecs {
            for &level in &codec.levels {
                for iteration in 1..=iterations {
                    jobs.push(BenchmarkJob {
                        file,
                        label: label.clone(),
                        codec,
                        level,
                        iteration,
                    });
                }
            }
        }
    }
    Ok(jobs)
}
