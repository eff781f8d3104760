// Integration tests for util/ and digest.rs: input expansion and content digests
//
// Coverage:
//   - directories expand to their regular files, sorted by name
//   - plain files pass through in order, duplicates dropped
//   - missing plain files pass through (they fail later, per job)
//   - digest of a multi-chunk file matches a one-shot digest of its content
//   - different content gives different digests
//   - precompute skips unreadable files

use std::fs;
use std::path::PathBuf;

use compstat::digest::{digest_file, digest_reader, precompute, DIGEST_CHUNK_SIZE};
use compstat::util::{expand_inputs, file_size};
use tempfile::TempDir;

// ── expand_inputs ─────────────────────────────────────────────────────────────

#[cfg(feature = "recursive")]
#[test]
fn directories_expand_to_sorted_regular_files() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(corpus.join("nested")).unwrap();
    fs::write(corpus.join("b.bin"), b"b").unwrap();
    fs::write(corpus.join("a.bin"), b"a").unwrap();
    fs::write(corpus.join("nested/c.bin"), b"c").unwrap();

    let files = expand_inputs(&[corpus.clone()]).unwrap();
    assert_eq!(
        files,
        vec![
            corpus.join("a.bin"),
            corpus.join("b.bin"),
            corpus.join("nested/c.bin"),
        ]
    );
}

#[test]
fn plain_files_keep_order_and_drop_duplicates() {
    let inputs = vec![
        PathBuf::from("z.bin"),
        PathBuf::from("a.bin"),
        PathBuf::from("z.bin"),
    ];
    let files = expand_inputs(&inputs).unwrap();
    assert_eq!(files, vec![PathBuf::from("z.bin"), PathBuf::from("a.bin")]);
}

#[test]
fn missing_files_pass_through() {
    let files = expand_inputs(&[PathBuf::from("/no/such/file.bin")]).unwrap();
    assert_eq!(files.len(), 1);
    assert!(file_size(&files[0]).is_err());
}

// ── digest ────────────────────────────────────────────────────────────────────

#[test]
fn chunked_digest_matches_in_memory_digest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.bin");
    let content: Vec<u8> = (0..DIGEST_CHUNK_SIZE * 3 + 17)
        .map(|i| (i * 31 % 256) as u8)
        .collect();
    fs::write(&path, &content).unwrap();

    let from_file = digest_file(&path).unwrap();
    let from_memory = digest_reader(content.as_slice()).unwrap();
    assert_eq!(from_file, from_memory);
    assert_eq!(from_file.to_string().len(), 64);
}

#[test]
fn one_byte_difference_changes_digest() {
    let a = digest_reader(&b"compression benchmark"[..]).unwrap();
    let b = digest_reader(&b"compression benchmarK"[..]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn precompute_skips_unreadable_files() {
    compstat::display::set_display_level(0);
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.bin");
    fs::write(&good, b"payload").unwrap();
    let gone = dir.path().join("gone.bin");

    let table = precompute(&[good.clone(), gone.clone()]);
    assert_eq!(table.len(), 1);
    assert_eq!(table[&good], digest_file(&good).unwrap());
    assert!(!table.contains_key(&gone));
}
