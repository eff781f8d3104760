// e2e/cli_integration.rs: black-box tests of the `compstat` binary
//
// Runs the binary with std::process::Command and checks exit codes, stdout
// and stderr. Tests that need a real compressor skip themselves when it is
// not installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use compstat::codec::resolve_executable;
use tempfile::TempDir;

/// Locate the `compstat` binary produced by Cargo.
fn compstat_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_compstat") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("compstat");
    p
}

/// Runs `compstat` inside `dir` with scratch and output paths pointed into it.
fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(compstat_bin())
        .args(args)
        .arg("--tmpdir")
        .arg(dir.join("scratch"))
        .arg("--output")
        .arg(dir.join("results.csv"))
        .current_dir(dir)
        .env_remove("COMPSTAT_PARALLELISM")
        .env_remove("COMPSTAT_TMPDIR")
        .output()
        .expect("failed to run compstat")
}

fn make_input(dir: &Path) -> PathBuf {
    let path = dir.join("input.txt");
    fs::write(&path, "compstat end-to-end input\n".repeat(2000)).unwrap();
    path
}

// ── 1. Informational flags ────────────────────────────────────────────────────

#[test]
fn test_cli_list_codecs() {
    let output = Command::new(compstat_bin())
        .arg("--list-codecs")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["brotli", "bzip2", "gzip", "lz4", "xz", "zstd"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn test_cli_version() {
    let output = Command::new(compstat_bin())
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "{stdout}");
}

// ── 2. Fatal errors exit 1 ────────────────────────────────────────────────────

#[test]
fn test_cli_unknown_codec_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = make_input(dir.path());
    let output = run_in(
        dir.path(),
        &["--files", input.to_str().unwrap(), "--codecs", "snappy"],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown codec: snappy"), "{stderr}");
    assert!(!dir.path().join("results.csv").exists());
}

#[test]
fn test_cli_zero_parallelism_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = make_input(dir.path());
    let output = run_in(
        dir.path(),
        &[
            "--files",
            input.to_str().unwrap(),
            "--codecs",
            "zstd",
            "--parallelism",
            "0",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parallelism"), "{stderr}");
}

#[test]
fn test_cli_quiet_still_reports_fatal_error() {
    let dir = TempDir::new().unwrap();
    let input = make_input(dir.path());
    let output = run_in(
        dir.path(),
        &["-qq", "--files", input.to_str().unwrap(), "--codecs", "snappy"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_cli_missing_files_is_usage_error() {
    let output = Command::new(compstat_bin())
        .args(["--codecs", "zstd"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(0));
}

// ── 3. Real run (needs lz4 installed) ─────────────────────────────────────────

#[test]
fn test_cli_lz4_run_writes_csv_and_json() {
    if resolve_executable(Path::new("lz4")).is_none() {
        eprintln!("lz4 not installed, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = make_input(dir.path());
    let json = dir.path().join("results.json");
    let output = run_in(
        dir.path(),
        &[
            "--files",
            input.to_str().unwrap(),
            "--codecs",
            "lz4",
            "--parallelism",
            "2",
            "--json",
            json.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Benchmark complete!"), "{stdout}");
    assert!(stdout.contains("Total runs: 9"), "{stdout}");

    let csv = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 10);
    assert!(csv.lines().skip(1).all(|l| l.contains(",true,")));

    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(snapshot.as_array().map(Vec::len), Some(9));
    assert_eq!(
        fs::read_dir(dir.path().join("scratch")).unwrap().count(),
        0,
        "scratch files left behind"
    );
}

// ── 4. CSV write failure ──────────────────────────────────────────────────────

// The child may not grow any file past FSIZE_LIMIT bytes. The CSV is already
// that long, so every append fails with EFBIG while scratch files and the JSON
// snapshot stay well below the limit.
#[cfg(unix)]
#[test]
fn test_cli_csv_write_failure_still_writes_snapshot() {
    use std::os::unix::process::CommandExt;

    const FSIZE_LIMIT: usize = 64 * 1024;

    if resolve_executable(Path::new("lz4")).is_none() {
        eprintln!("lz4 not installed, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("small.txt");
    fs::write(&input, "compstat small input\n".repeat(40)).unwrap();
    let csv = dir.path().join("results.csv");
    let mut existing = String::from("run_id,algorithm\n");
    while existing.len() < FSIZE_LIMIT {
        existing.push_str("previous,row\n");
    }
    fs::write(&csv, &existing[..FSIZE_LIMIT]).unwrap();
    let json = dir.path().join("results.json");

    let mut cmd = Command::new(compstat_bin());
    cmd.args(["--files", input.to_str().unwrap(), "--codecs", "lz4"])
        .arg("--tmpdir")
        .arg(dir.path().join("scratch"))
        .arg("--output")
        .arg(&csv)
        .arg("--json")
        .arg(&json)
        .env_remove("COMPSTAT_PARALLELISM")
        .env_remove("COMPSTAT_TMPDIR");
    // SAFETY: only async-signal-safe libc calls run between fork and exec.
    unsafe {
        cmd.pre_exec(|| {
            libc::signal(libc::SIGXFSZ, libc::SIG_IGN);
            let limit = libc::rlimit {
                rlim_cur: FSIZE_LIMIT as libc::rlim_t,
                rlim_max: FSIZE_LIMIT as libc::rlim_t,
            };
            if libc::setrlimit(libc::RLIMIT_FSIZE, &limit) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
    let output = cmd.output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fs::metadata(&csv).unwrap().len() as usize, FSIZE_LIMIT);
    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(snapshot.as_array().map(Vec::len), Some(9));
}
