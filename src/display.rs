//! Verbosity-levelled diagnostics shared by the CLI and the benchmark engine.
//!
//! Every progress line, warning and per-job failure in this crate goes through
//! the macros below, gated on a single process-wide display level:
//!
//! | level | meaning                                              |
//! |-------|------------------------------------------------------|
//! | 0     | silent                                               |
//! | 1     | errors only (per-job failures, fatal messages)       |
//! | 2     | normal: progress, warnings, summary (default)        |
//! | 3     | details: resolved paths, thread counts, digests      |
//! | 4     | verbose: scratch cleanup, raw argument vectors       |
//!
//! The level is an atomic so worker threads can read it without locking.

use std::sync::atomic::{AtomicU32, Ordering};

/// Default display level used when neither `-v` nor `-q` is given.
pub const DEFAULT_DISPLAY_LEVEL: u32 = 2;

/// Highest meaningful display level.
pub const MAX_DISPLAY_LEVEL: u32 = 4;

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(DEFAULT_DISPLAY_LEVEL);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level, clamped to [`MAX_DISPLAY_LEVEL`].
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level.min(MAX_DISPLAY_LEVEL), Ordering::Relaxed);
}

/// Print to stdout. Used for report output that should survive `2>/dev/null`.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr unconditionally.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Print to stderr when the display level is at least `$level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::display::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
