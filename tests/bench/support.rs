// Shared fixtures for the bench integration suite.
//
// Synthetic codecs are ordinary Unix tools (`cp`, `cat`, `sh`, `false`) wired
// into `CodecDescriptor`s, so the suite needs no real compressor installed.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use compstat::codec::{level_range, CodecDescriptor, CodecRegistry, OutputMode};
use compstat::config::RunConfig;
use tempfile::TempDir;

fn os(s: &str) -> OsString {
    OsString::from(s)
}

fn p(path: &Path) -> OsString {
    path.as_os_str().to_os_string()
}

// ── Argument builders ─────────────────────────────────────────────────────────

fn cp_compress(_level: i32, _threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![p(input), p(output)]
}

fn cp_decompress(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![p(input), p(output)]
}

fn cat_compress(_level: i32, _threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    vec![p(input)]
}

fn cat_decompress(_threads: usize, input: &Path, _output: &Path) -> Vec<OsString> {
    vec![p(input)]
}

fn sh_copy(_level: i32, _threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![os("-c"), os(r#"cp "$1" "$2""#), os("sh"), p(input), p(output)]
}

fn sh_corrupt(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        os("-c"),
        os(r#"printf corrupted > "$2""#),
        os("sh"),
        p(input),
        p(output),
    ]
}

fn sh_copy_back(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![os("-c"), os(r#"cp "$1" "$2""#), os("sh"), p(input), p(output)]
}

// Overwrites byte 7 of the artifact after an exact copy.
fn sh_copy_flip(_level: i32, _threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        os("-c"),
        os(r#"cp "$1" "$2" && printf X | dd of="$2" bs=1 seek=7 conv=notrunc"#),
        os("sh"),
        p(input),
        p(output),
    ]
}

// Real lz4 frame with one payload byte overwritten.
fn sh_lz4_flip(_level: i32, _threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        os("-c"),
        os(r#"lz4 -q -1 -f "$1" "$2" && printf X | dd of="$2" bs=1 seek=20 conv=notrunc"#),
        os("sh"),
        p(input),
        p(output),
    ]
}

fn sh_lz4_decompress(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        os("-c"),
        os(r#"lz4 -q -d -f "$1" "$2""#),
        os("sh"),
        p(input),
        p(output),
    ]
}

fn sh_fail(_threads: usize, input: &Path, output: &Path) -> Vec<OsString> {
    vec![os("-c"), os("exit 3"), os("sh"), p(input), p(output)]
}

fn sh_hang(_level: i32, _threads: usize, _input: &Path, _output: &Path) -> Vec<OsString> {
    vec![os("-c"), os("sleep 10")]
}

// ── Codecs ────────────────────────────────────────────────────────────────────

fn descriptor(
    name: &str,
    executable: &str,
    levels: Vec<i32>,
    output_mode: OutputMode,
    compress_args: compstat::codec::CompressArgsFn,
    decompress_args: compstat::codec::DecompressArgsFn,
) -> CodecDescriptor {
    CodecDescriptor {
        name: name.to_owned(),
        executable: PathBuf::from(executable),
        extension: format!(".{name}"),
        levels,
        supports_threading: false,
        output_mode,
        compress_args,
        decompress_args,
    }
}

/// Lossless, single-threaded, levels 1..=9; argument-mode output.
pub fn copy_codec() -> CodecDescriptor {
    descriptor(
        "copy",
        "cp",
        level_range(1, 9),
        OutputMode::Argument,
        cp_compress,
        cp_decompress,
    )
}

/// Lossless, threading-capable, one level; stdout-mode output.
pub fn cat_codec() -> CodecDescriptor {
    let mut codec = descriptor(
        "cat",
        "cat",
        vec![1],
        OutputMode::Stdout,
        cat_compress,
        cat_decompress,
    );
    codec.supports_threading = true;
    codec
}

/// Compresses fine, decompresses to the wrong bytes.
pub fn corrupt_codec() -> CodecDescriptor {
    descriptor("corrupt", "sh", vec![1], OutputMode::Argument, sh_copy, sh_corrupt)
}

/// One byte of the compressed artifact is damaged; decompression copies it back.
pub fn flipped_byte_codec() -> CodecDescriptor {
    descriptor("flipbyte", "sh", vec![1], OutputMode::Argument, sh_copy_flip, sh_copy_back)
}

/// Real lz4 with one byte of the frame damaged after compression.
pub fn lz4_flipped_byte_codec() -> CodecDescriptor {
    descriptor(
        "lz4flip",
        "sh",
        vec![1],
        OutputMode::Argument,
        sh_lz4_flip,
        sh_lz4_decompress,
    )
}

/// Compresses fine, decompression exits non-zero.
pub fn broken_decoder_codec() -> CodecDescriptor {
    descriptor("brokendec", "sh", vec![1], OutputMode::Argument, sh_copy, sh_fail)
}

/// Compression always exits non-zero.
pub fn failing_codec() -> CodecDescriptor {
    descriptor("failing", "false", vec![1], OutputMode::Argument, cp_compress, cp_decompress)
}

/// Compression never finishes on its own.
pub fn hanging_codec() -> CodecDescriptor {
    descriptor("hang", "sh", vec![1], OutputMode::Argument, sh_hang, cp_decompress)
}

/// Known to the registry but not installed.
pub fn missing_codec() -> CodecDescriptor {
    descriptor(
        "missing",
        "compstat-no-such-tool",
        vec![1],
        OutputMode::Argument,
        cp_compress,
        cp_decompress,
    )
}

pub fn registry() -> CodecRegistry {
    let mut registry = CodecRegistry::new();
    for codec in [
        copy_codec(),
        cat_codec(),
        corrupt_codec(),
        flipped_byte_codec(),
        lz4_flipped_byte_codec(),
        broken_decoder_codec(),
        failing_codec(),
        hanging_codec(),
        missing_codec(),
    ] {
        registry.register(codec);
    }
    registry
}

// ── Files and configuration ───────────────────────────────────────────────────

/// Writes `len` bytes of mildly repetitive content to `dir/name`.
pub fn write_input(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, content).unwrap();
    path
}

/// A quiet single-worker configuration rooted in `dir`.
pub fn config(dir: &TempDir, files: Vec<PathBuf>, codecs: &[&str]) -> RunConfig {
    compstat::display::set_display_level(0);
    RunConfig {
        files,
        codecs: codecs.iter().map(|c| c.to_string()).collect(),
        compress_threads: 4,
        decompress_threads: 4,
        iterations: 1,
        scratch_dir: dir.path().join("scratch"),
        output_csv: dir.path().join("results.csv"),
        output_json: None,
        verify: true,
        skip_decompression: false,
        parallelism: 1,
        timeout: Some(Duration::from_secs(30)),
    }
}

pub fn csv_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

pub fn scratch_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
