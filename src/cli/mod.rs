//! Command-line front end: argument parsing and the codec listing.

pub mod args;

pub use args::Args;

use crate::codec::CodecRegistry;
use crate::displayout;

/// Prints every registered codec with its levels and whether its executable
/// was found on this host.
pub fn print_codec_list(registry: &CodecRegistry) {
    for name in registry.all_names() {
        let Ok(codec) = registry.lookup(name) else {
            continue;
        };
        let levels = match (codec.levels.first(), codec.levels.last()) {
            (Some(lo), Some(hi)) if lo != hi => format!("{lo}-{hi}"),
            (Some(lo), _) => lo.to_string(),
            _ => "-".to_owned(),
        };
        let status = if CodecRegistry::is_available(codec) {
            "available"
        } else {
            "not found"
        };
        displayout!(
            "{:<8} {:<10} levels {:<6} {}{}\n",
            codec.name,
            codec.executable.display(),
            levels,
            status,
            if codec.supports_threading { "" } else { " (single-threaded)" }
        );
    }
}
