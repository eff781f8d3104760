//! Input list expansion.
//!
//! [`expand_inputs`] turns the paths given on the command line into the flat
//! list of files to benchmark. With the `recursive` feature (on by default)
//! directories are walked with [`walkdir`] and replaced by the regular files
//! they contain, in file-name order so the job matrix is reproducible.
//! Symlinks inside a walked directory are not followed and not included.
//!
//! Duplicate paths are dropped, keeping the first occurrence.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Expand `inputs` into a flat, de-duplicated list of files.
///
/// Non-directory inputs are forwarded unchanged without an existence check;
/// a missing file surfaces later as a per-job failure.
pub fn expand_inputs(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(inputs.len());
    for input in inputs {
        for path in expand_one(input)? {
            if seen.insert(path.clone()) {
                result.push(path);
            }
        }
    }
    Ok(result)
}

#[cfg(feature = "recursive")]
fn expand_one(input: &Path) -> io::Result<Vec<PathBuf>> {
    use walkdir::WalkDir;

    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.io_error()
                .map(|io| io::Error::new(io.kind(), io.to_string()))
                .unwrap_or_else(|| io::Error::other(e.to_string()))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(not(feature = "recursive"))]
fn expand_one(input: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(vec![input.to_path_buf()])
}
