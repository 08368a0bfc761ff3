// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Tests for log tailing

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[parameterized(
    fewer_than_available = { 2, &["c", "d"] },
    exactly_available = { 4, &["a", "b", "c", "d"] },
    more_than_available = { 10, &["a", "b", "c", "d"] },
    zero = { 0, &[] },
)]
fn tail_returns_last_lines(count: usize, expected: &[&str]) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.log");
    std::fs::write(&path, "a\nb\nc\nd\n").unwrap();

    assert_eq!(tail(&path, count).unwrap(), expected);
}

#[test]
fn tail_of_empty_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.log");
    std::fs::write(&path, "").unwrap();
    assert!(tail(&path, 5).unwrap().is_empty());
}

#[test]
fn tail_missing_file_errors() {
    let dir = TempDir::new().unwrap();
    assert!(tail(&dir.path().join("absent.log"), 5).is_err());
}
