//! Built-in codec table.
//!
//! Each tool gets a pair of argument builders plus a descriptor constructor.
//! Tools that write compressed bytes to standard output (`xz`, `pigz`,
//! `pbzip2`) are declared [`OutputMode::Stdout`]; their builders ignore the
//! output path.

use std::ffi::OsString;
use std::path::Path;

use super::{level_range, CodecDescriptor, OutputMode};

fn args<const N: usize>(items: [OsString; N]) -> Vec<OsString> {
    items.into()
}

fn s(value: impl Into<String>) -> OsString {
    OsString::from(value.into())
}

fn p(path: &Path) -> OsString {
    path.as_os_str().to_os_string()
}

// ── zstd ──────────────────────────────────────────────────────────────────────

pub const ZSTD_MAX_LEVEL: i32 = 19;

fn zstd_compress(level: i32, threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    let mut argv = Vec::with_capacity(9);
    if level == ZSTD_MAX_LEVEL {
        argv.push(s("--ultra"));
        argv.push(s("--long=31"));
    }
    argv.extend(args([
        s(format!("-{level}")),
        s(format!("-T{threads}")),
        s("-q"),
        s("-f"),
        s("-o"),
        p(output),
        p(input),
    ]));
    argv
}

// `--long=31` raises the decoder's window limit to match the top level;
// frames with a smaller window are unaffected.
fn zstd_decompress(threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    args([
        s("-d"),
        s("--long=31"),
        s(format!("-T{threads}")),
        s("-q"),
        s("-f"),
        s("-o"),
        p(output),
        p(input),
    ])
}

pub fn zstd() -> CodecDescriptor {
    CodecDescriptor {
        name: "zstd".into(),
        executable: "zstd".into(),
        extension: ".zst".into(),
        levels: level_range(1, ZSTD_MAX_LEVEL),
        supports_threading: true,
        output_mode: OutputMode::Argument,
        compress_args: zstd_compress,
        decompress_args: zstd_decompress,
    }
}

// ── xz ────────────────────────────────────────────────────────────────────────

pub const XZ_MAX_LEVEL: i32 = 9;

fn xz_compress(level: i32, threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    let mut argv = Vec::with_capacity(5);
    if level == XZ_MAX_LEVEL {
        argv.push(s("-e"));
    }
    argv.extend(args([
        s(format!("-{level}")),
        s(format!("-T{threads}")),
        s("-c"),
        p(input),
    ]));
    argv
}

fn xz_decompress(threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    args([s("-d"), s(format!("-T{threads}")), s("-c"), p(input)])
}

pub fn xz() -> CodecDescriptor {
    CodecDescriptor {
        name: "xz".into(),
        executable: "xz".into(),
        extension: ".xz".into(),
        levels: level_range(0, XZ_MAX_LEVEL),
        supports_threading: true,
        output_mode: OutputMode::Stdout,
        compress_args: xz_compress,
        decompress_args: xz_decompress,
    }
}

// ── gzip (pigz) ───────────────────────────────────────────────────────────────

fn gzip_compress(level: i32, threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    args([
        s(format!("-{level}")),
        s("-p"),
        s(threads.to_string()),
        s("-c"),
        p(input),
    ])
}

fn gzip_decompress(threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    args([s("-d"), s("-p"), s(threads.to_string()), s("-c"), p(input)])
}

pub fn gzip() -> CodecDescriptor {
    CodecDescriptor {
        name: "gzip".into(),
        executable: "pigz".into(),
        extension: ".gz".into(),
        levels: level_range(1, 9),
        supports_threading: true,
        output_mode: OutputMode::Stdout,
        compress_args: gzip_compress,
        decompress_args: gzip_decompress,
    }
}

// ── lz4 ───────────────────────────────────────────────────────────────────────

// The lz4 CLI is single-threaded; the thread count is never passed.
fn lz4_compress(level: i32, _threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    args([s(format!("-{level}")), s("-f"), p(input), p(output)])
}

fn lz4_decompress(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    args([s("-d"), s("-f"), p(input), p(output)])
}

pub fn lz4() -> CodecDescriptor {
    CodecDescriptor {
        name: "lz4".into(),
        executable: "lz4".into(),
        extension: ".lz4".into(),
        levels: level_range(1, 9),
        supports_threading: false,
        output_mode: OutputMode::Argument,
        compress_args: lz4_compress,
        decompress_args: lz4_decompress,
    }
}

// ── bzip2 (pbzip2) ────────────────────────────────────────────────────────────

fn bzip2_compress(level: i32, threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    args([
        s(format!("-{level}")),
        s(format!("-p{threads}")),
        s("-c"),
        p(input),
    ])
}

fn bzip2_decompress(threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    args([s("-d"), s(format!("-p{threads}")), s("-c"), p(input)])
}

pub fn bzip2() -> CodecDescriptor {
    CodecDescriptor {
        name: "bzip2".into(),
        executable: "pbzip2".into(),
        extension: ".bz2".into(),
        levels: level_range(1, 9),
        supports_threading: true,
        output_mode: OutputMode::Stdout,
        compress_args: bzip2_compress,
        decompress_args: bzip2_decompress,
    }
}

// ── brotli ────────────────────────────────────────────────────────────────────

// brotli has no worker-thread option (`-j` means "remove source"), so it is
// declared single-threaded and no thread flag is emitted.
fn brotli_compress(level: i32, _threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    args([
        s("-q"),
        s(level.to_string()),
        s("-f"),
        s("-o"),
        p(output),
        p(input),
    ])
}

fn brotli_decompress(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    args([s("-d"), s("-f"), s("-o"), p(output), p(input)])
}

pub fn brotli() -> CodecDescriptor {
    CodecDescriptor {
        name: "brotli".into(),
        executable: "brotli".into(),
        extension: ".br".into(),
        levels: level_range(1, 11),
        supports_threading: false,
        output_mode: OutputMode::Argument,
        compress_args: brotli_compress,
        decompress_args: brotli_decompress,
    }
}

/// Every built-in descriptor.
pub fn all() -> Vec<CodecDescriptor> {
    vec![zstd(), xz(), gzip(), lz4(), bzip2(), brotli()]
}
