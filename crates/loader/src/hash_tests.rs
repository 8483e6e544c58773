// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn hashes_known_vector() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"abc").unwrap();
    // SHA-256("abc")
    assert_eq!(
        sha256_file(file.path()).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn empty_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert_eq!(
        sha256_file(file.path()).unwrap(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn identical_content_identical_hash() {
    let mut a = tempfile::NamedTempFile::new().unwrap();
    let mut b = tempfile::NamedTempFile::new().unwrap();
    a.write_all(b"same bytes").unwrap();
    b.write_all(b"same bytes").unwrap();
    assert_eq!(sha256_file(a.path()).unwrap(), sha256_file(b.path()).unwrap());
}

#[test]
fn missing_file_errors() {
    assert!(sha256_file(Path::new("/nonexistent/file.csv")).is_err());
}
