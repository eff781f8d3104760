//! Content digests used to check that a round trip reproduced its input.
//!
//! Files are streamed through SHA-256 in fixed-size chunks so inputs larger
//! than memory can be verified.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest as _, Sha256};

use crate::displaylevel;

/// Read buffer size for [`digest_file`].
pub const DIGEST_CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 of a file's content. Compares by value; displays as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Digest everything `reader` yields.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DIGEST_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Digest(hasher.finalize().into()))
}

/// Digest the file at `path`.
pub fn digest_file(path: &Path) -> io::Result<Digest> {
    digest_reader(File::open(path)?)
}

/// Expected digests for every input file, computed before any job runs and
/// read-only afterwards.
///
/// A file that cannot be hashed is left out of the table (with a warning);
/// its jobs still run but can never report `verified = true`.
pub fn precompute(files: &[PathBuf]) -> HashMap<PathBuf, Digest> {
    let mut table = HashMap::with_capacity(files.len());
    for path in files {
        if table.contains_key(path) {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        displaylevel!(2, "Hashing {}... ", name);
        match digest_file(path) {
            Ok(digest) => {
                displaylevel!(2, "ok\n");
                displaylevel!(3, "  sha256 {}\n", digest);
                table.insert(path.clone(), digest);
            }
            Err(e) => {
                displaylevel!(2, "failed: {}\n", e);
            }
        }
    }
    table
}
