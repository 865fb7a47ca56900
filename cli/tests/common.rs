//! # bgh Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and runs the compiled `bgh` binary through
//! `assert_cmd`.
//!
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// `bgh` binary built for this test run.
pub fn bgh_cmd() -> Command {
    Command::cargo_bin("bgh").expect("Failed to find bgh binary for testing")
}

/// `bgh --config <file>` with `contents` as the only configuration, so the
/// user's own config files cannot influence the test. Keep the returned
/// directory alive for the duration of the command.
pub fn bgh_with_config(contents: &str) -> (Command, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("bgh.toml");
    fs::write(&path, contents).expect("Failed to write test config");
    let mut cmd = bgh_cmd();
    cmd.arg("--config").arg(&path);
    (cmd, dir)
}
