//! End-to-end tests for the `snapshot` and `completions` commands
//!
//! These tests invoke the actual CLI binary and validate its behavior
//! from a user's perspective.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Test that --help flag shows help information
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_snapshot_help() {
    let mut cmd = cargo_bin_cmd!("raptly");

    cmd.arg("snapshot")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage aptly snapshots"));
}

/// Test that snapshots only support create and drop
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_snapshot_rejects_update_task() {
    let mut cmd = cargo_bin_cmd!("raptly");

    cmd.arg("snapshot")
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

/// Test that missing config file produces an error
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_snapshot_missing_config() {
    let mut cmd = cargo_bin_cmd!("raptly");

    cmd.arg("--config")
        .arg("/nonexistent/raptly.yaml")
        .arg("snapshot")
        .arg("create")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

/// Test that the config path can come from the environment
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_snapshot_config_from_env() {
    let mut cmd = cargo_bin_cmd!("raptly");

    cmd.env("RAPTLY_CONFIG", "/nonexistent/raptly.yaml")
        .arg("snapshot")
        .arg("create")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/raptly.yaml"));
}

/// Test completion generation for bash
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("raptly");

    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("raptly"));
}

/// Test that completions rejects unknown shells
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_completions_unknown_shell() {
    let mut cmd = cargo_bin_cmd!("raptly");

    cmd.arg("completions")
        .arg("tcsh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
