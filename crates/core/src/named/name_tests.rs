// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    plain = { "build", "build" },
    forward_slash = { "a/b", "ab" },
    backslash = { "a\\b", "ab" },
    mixed_separators = { "/tmp\\x/y", "tmpxy" },
    case_preserved = { "MyApp", "MyApp" },
    nul_stripped = { "a\0b", "ab" },
    dots_kept = { "my.app", "my.app" },
)]
fn normalizes(input: &str, expected: &str) {
    assert_eq!(normalize(input).unwrap().as_str(), expected);
}

#[parameterized(
    empty = { "" },
    slashes_only = { "//" },
    mixed_only = { "/\\/" },
)]
fn rejects_names_with_nothing_left(input: &str) {
    assert!(matches!(normalize(input), Err(SyncError::InvalidName(_))));
}

#[test]
fn global_key_and_file_name() {
    let name = MutexName::new("indexer").unwrap();

    assert_eq!(name.global_key(), "Global.indexer");
    assert_eq!(name.file_name(), "Global.indexer.lock");
    assert_eq!(name.to_string(), "indexer");
}

#[test]
fn separator_variants_share_a_file() {
    let a = MutexName::new("team/build").unwrap();
    let b = MutexName::new("team\\build").unwrap();
    assert_eq!(a.file_name(), b.file_name());
}

#[test]
fn long_names_are_hashed() {
    let long = "x".repeat(300);
    let other = "y".repeat(300);
    let name = MutexName::new(&long).unwrap();

    let file = name.file_name();
    assert!(file.len() <= MAX_FILE_NAME);
    assert!(file.starts_with(GLOBAL_PREFIX));
    assert_eq!(file, MutexName::new(&long).unwrap().file_name());
    assert_ne!(file, MutexName::new(&other).unwrap().file_name());
}

#[test]
fn sha256_hex_matches_known_digest() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn application_name_is_stable() {
    let first = application_mutex_name();
    let second = application_mutex_name();

    assert_eq!(first, second);
    assert!(first.starts_with("app-"));
    assert!(MutexName::new(first).is_ok());
}
