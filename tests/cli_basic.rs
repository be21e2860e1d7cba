//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags and rejects bad input
//! before any network activity.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `vidgrab` binary.
fn vidgrab() -> Command {
    Command::cargo_bin("vidgrab").expect("binary 'vidgrab' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    vidgrab()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: vidgrab"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--downloader"))
        .stdout(predicate::str::contains("--skip-page-attempt"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn version_flag_shows_semver() {
    vidgrab()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^vidgrab \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn unknown_flag_fails() {
    vidgrab()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn missing_explicit_config_fails() {
    vidgrab()
        .args(["--config", "/nonexistent/vidgrab/config.toml", "https://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
