//! Filesystem and host helpers used by the CLI and the benchmark engine.
//!
//! - [`cores`]: CPU count used for default thread counts
//! - [`file_size`]: size of a regular input or output file
//! - [`file_list`]: input list expansion (directories walked recursively)

pub mod cores;
pub mod file_list;
pub mod file_size;

pub use cores::{count_cores, resolve_threads};
pub use file_list::expand_inputs;
pub use file_size::file_size;

use std::path::Path;

/// Final path component as UTF-8 (lossy), or the whole path when it has none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
