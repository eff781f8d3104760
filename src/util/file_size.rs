//! File size lookup for benchmark inputs and artifacts.
//!
//! Unlike a best-effort size lookup, failures are reported: a job whose input
//! size cannot be read is abandoned, so the caller needs the cause.

use std::fs;
use std::io;
use std::path::Path;

/// Size in bytes of the regular file at `path`.
///
/// Returns `InvalidInput` when `path` exists but is not a regular file
/// (directory, device, socket); symlinks are followed.
pub fn file_size(path: &Path) -> io::Result<u64> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }
    Ok(meta.len())
}
