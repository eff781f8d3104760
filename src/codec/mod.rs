//! Codec descriptors and the registry that resolves codec names.
//!
//! A [`CodecDescriptor`] is plain data plus two argument-building `fn`
//! pointers; nothing here starts a process. The registry is built once at
//! start-up ([`CodecRegistry::builtin`]) and then shared read-only by every
//! worker. Tests register synthetic descriptors through
//! [`CodecRegistry::register`].

pub mod builtin;

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// Builds the compression argument vector: `(level, threads, input, output)`.
pub type CompressArgsFn = fn(i32, usize, &Path, &Path) -> Vec<OsString>;

/// Builds the decompression argument vector: `(threads, input, output)`.
pub type DecompressArgsFn = fn(usize, &Path, &Path) -> Vec<OsString>;

/// Where a codec writes the bytes it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The output path is part of the argument vector.
    Argument,
    /// The tool writes to standard output; the caller redirects it to the
    /// output path.
    Stdout,
}

/// Static description of one external compression tool.
#[derive(Debug, Clone)]
pub struct CodecDescriptor {
    /// Registry key and value of the `algorithm` result column.
    pub name: String,
    /// Program name resolved on `PATH`, or an explicit path.
    pub executable: PathBuf,
    /// Extension of the compressed artifact, including the leading dot.
    pub extension: String,
    /// Valid compression levels, ascending.
    pub levels: Vec<i32>,
    /// When `false`, both thread counts are forced to 1.
    pub supports_threading: bool,
    pub output_mode: OutputMode,
    pub compress_args: CompressArgsFn,
    pub decompress_args: DecompressArgsFn,
}

impl CodecDescriptor {
    /// Argument vector for compressing `input` into `output` at `level`.
    pub fn compress_command(
        &self,
        level: i32,
        threads: usize,
        input: &Path,
        output: &Path,
    ) -> Vec<OsString> {
        (self.compress_args)(level, threads, input, output)
    }

    /// Argument vector for decompressing `input` into `output`.
    pub fn decompress_command(&self, threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
        (self.decompress_args)(threads, input, output)
    }

    /// The file the caller must redirect standard output into, if any.
    pub fn redirect_target<'p>(&self, output: &'p Path) -> Option<&'p Path> {
        match self.output_mode {
            OutputMode::Stdout => Some(output),
            OutputMode::Argument => None,
        }
    }

    /// Effective `(compress, decompress)` thread counts for this codec.
    pub fn effective_threads(&self, compress: usize, decompress: usize) -> (usize, usize) {
        if self.supports_threading {
            (compress, decompress)
        } else {
            (1, 1)
        }
    }
}

/// Inclusive ascending level range, e.g. `level_range(1, 9)` → `[1, 2, …, 9]`.
pub fn level_range(min: i32, max: i32) -> Vec<i32> {
    (min..=max).collect()
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Name-keyed catalogue of codec descriptors.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, CodecDescriptor>,
}

impl CodecRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in codec (see [`builtin::all`]).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::all() {
            registry.register(descriptor);
        }
        registry
    }

    /// Adds `descriptor`, replacing any entry with the same name.
    pub fn register(&mut self, descriptor: CodecDescriptor) {
        self.codecs.insert(descriptor.name.clone(), descriptor);
    }

    pub fn lookup(&self, name: &str) -> Result<&CodecDescriptor> {
        self.codecs
            .get(name)
            .ok_or_else(|| BenchError::UnknownCodec(name.to_owned()))
    }

    /// Registered names in sorted order.
    pub fn all_names(&self) -> Vec<&str> {
        self.codecs.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// `true` when the descriptor's executable can be started on this host.
    pub fn is_available(descriptor: &CodecDescriptor) -> bool {
        resolve_executable(&descriptor.executable).is_some()
    }
}

/// Resolves `program` the way a shell would: a path containing a separator is
/// checked directly, a bare name is searched on `PATH`.
pub fn resolve_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return is_executable(program).then(|| program.to_path_buf());
    }
    let path_var: OsString = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
        .or_else(|| windows_exe_candidate(&path_var, program.as_os_str()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(windows)]
fn windows_exe_candidate(path_var: &OsStr, program: &OsStr) -> Option<PathBuf> {
    let mut name = program.to_os_string();
    name.push(".exe");
    env::split_paths(path_var)
        .map(|dir| dir.join(&name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(not(windows))]
fn windows_exe_candidate(_path_var: &OsStr, _program: &OsStr) -> Option<PathBuf> {
    None
}
