//! Process execution adapter.
//!
//! Runs one external tool to completion and reports how long it took. Wall
//! time is measured from just before `spawn` to the moment the child is seen
//! to exit; argument construction and output-file creation are outside the
//! measured window. The child's stderr is discarded and stdin is closed.
//!
//! On Unix the child is reaped with `wait4(2)` so its own peak resident set
//! size is available. Exit is first observed with `waitid(WNOWAIT)`, leaving a
//! zombie in place until the optional deadline watchdog has been disarmed; a
//! late SIGKILL can therefore never hit a recycled pid.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use thiserror::Error;

/// A finished, successful process run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Execution {
    /// Wall time from spawn to exit.
    pub elapsed: Duration,
    /// Peak resident set size of the child, when the platform reports it.
    pub max_rss_bytes: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output file {}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for child: {0}")]
    Wait(#[source] io::Error),

    #[error("execution failed: {status}")]
    Failed { status: ExitStatus },

    #[error("killed after exceeding the {after:?} deadline")]
    TimedOut { after: Duration },
}

/// Run `program` with `args`, without a deadline.
///
/// When `stdout_file` is given it is created (or truncated) and receives the
/// child's standard output; otherwise standard output is discarded.
pub fn execute(
    program: &Path,
    args: &[OsString],
    stdout_file: Option<&Path>,
) -> Result<Execution, ExecError> {
    execute_with_deadline(program, args, stdout_file, None)
}

/// Like [`execute`], but kills the child once `deadline` has elapsed.
pub fn execute_with_deadline(
    program: &Path,
    args: &[OsString],
    stdout_file: Option<&Path>,
    deadline: Option<Duration>,
) -> Result<Execution, ExecError> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).stderr(Stdio::null());
    match stdout_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| ExecError::Redirect {
                path: path.to_path_buf(),
                source,
            })?;
            cmd.stdout(Stdio::from(file));
        }
        None => {
            cmd.stdout(Stdio::null());
        }
    }

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;
    // Drops the parent's copy of the redirected stdout handle.
    drop(cmd);

    let watchdog = deadline.map(|limit| Watchdog::arm(child.id(), limit));
    let exited = wait_exit(&mut child);
    let elapsed = start.elapsed();
    let fired = watchdog.map(Watchdog::disarm).unwrap_or(false);
    if let Err(e) = exited {
        return Err(reap_after_failed_wait(&mut child, e));
    }

    let (status, max_rss_bytes) = reap(child)?;
    if fired {
        return Err(ExecError::TimedOut {
            after: deadline.unwrap_or_default(),
        });
    }
    if !status.success() {
        return Err(ExecError::Failed { status });
    }
    Ok(Execution {
        elapsed,
        max_rss_bytes,
    })
}

/// Human-readable command line, for verbose logging only.
pub fn render_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Deadline watchdog ─────────────────────────────────────────────────────────

struct Watchdog {
    disarm: Sender<()>,
    handle: JoinHandle<bool>,
}

impl Watchdog {
    fn arm(pid: u32, limit: Duration) -> Self {
        let (disarm, rx) = bounded::<()>(1);
        let handle = thread::spawn(move || match rx.recv_timeout(limit) {
            Err(RecvTimeoutError::Timeout) => kill_child(pid),
            _ => false,
        });
        Watchdog { disarm, handle }
    }

    /// Stops the watchdog; returns `true` if it had already killed the child.
    fn disarm(self) -> bool {
        let _ = self.disarm.send(());
        self.handle.join().unwrap_or(false)
    }
}

/// Sends SIGKILL; returns `true` when the child was actually killed.
#[cfg(unix)]
fn kill_child(pid: u32) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as libc::pid_t), Signal::SIGKILL).is_ok()
}

// No pid-based kill off Unix; the deadline is not enforced there.
#[cfg(not(unix))]
fn kill_child(_pid: u32) -> bool {
    false
}

// ── Waiting and reaping ───────────────────────────────────────────────────────

/// Blocks until the child has exited, without reaping it.
#[cfg(unix)]
fn wait_exit(child: &mut Child) -> Result<(), ExecError> {
    let pid = child.id() as libc::id_t;
    loop {
        // SAFETY: an all-zero siginfo_t is a valid value for an out-parameter.
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        // SAFETY: `pid` is our own, not yet reaped child and `info` is valid
        // for writes. WNOWAIT leaves the child waitable for `reap`.
        let rc = unsafe {
            libc::waitid(
                libc::P_PID,
                pid,
                &mut info,
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(ExecError::Wait(err));
        }
    }
}

#[cfg(not(unix))]
fn wait_exit(child: &mut Child) -> Result<(), ExecError> {
    child.wait().map(drop).map_err(ExecError::Wait)
}

/// Kills and reaps the child after `wait_exit` failed, so no zombie is left.
fn reap_after_failed_wait(child: &mut Child, err: ExecError) -> ExecError {
    let _ = child.kill();
    let _ = child.wait();
    err
}

#[cfg(unix)]
fn reap(child: Child) -> Result<(ExitStatus, Option<u64>), ExecError> {
    use std::os::unix::process::ExitStatusExt;

    let pid = child.id() as libc::pid_t;
    let mut status: libc::c_int = 0;
    // SAFETY: rusage is a plain C struct; all-zero is a valid value.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    loop {
        // SAFETY: `pid` is our own exited child; both out-pointers are valid.
        let rc = unsafe { libc::wait4(pid, &mut status, 0, &mut usage) };
        if rc == pid {
            break;
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(ExecError::Wait(err));
        }
    }
    Ok((
        ExitStatus::from_raw(status),
        Some(max_rss_to_bytes(usage.ru_maxrss)),
    ))
}

#[cfg(not(unix))]
fn reap(mut child: Child) -> Result<(ExitStatus, Option<u64>), ExecError> {
    let status = child.wait().map_err(ExecError::Wait)?;
    Ok((status, None))
}

/// `ru_maxrss` is in bytes on Apple platforms and KiB elsewhere.
#[cfg(unix)]
fn max_rss_to_bytes(raw: libc::c_long) -> u64 {
    let raw = raw.max(0) as u64;
    if cfg!(any(target_os = "macos", target_os = "ios")) {
        raw
    } else {
        raw * 1024
    }
}
