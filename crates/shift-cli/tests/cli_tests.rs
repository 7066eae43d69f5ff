//! Integration tests for the `shift` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to drive the roster and
//! generate subcommands through the actual binary, each against its own
//! roster file in the system temp directory.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

/// Helper: path to the two-employee roster fixture.
fn fixture_roster_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/roster.json")
}

/// Helper: a fresh roster path unique to one test.
fn scratch_roster(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("shift-cli-test-{}.json", name));
    let _ = std::fs::remove_file(&path);
    path
}

/// Helper: copy the fixture into a scratch file the test may modify.
fn fixture_copy(name: &str) -> PathBuf {
    let path = scratch_roster(name);
    std::fs::copy(fixture_roster_path(), &path).expect("roster fixture must exist");
    path
}

fn shift(roster: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shift").unwrap();
    cmd.env_remove("SHIFT_ROSTER").arg("--roster").arg(roster);
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Employees
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn add_employee_then_list() {
    let roster = scratch_roster("add-employee");

    shift(&roster)
        .args(["add-employee", "--name", "AdaLovelace", "--email", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID: 1"))
        .stdout(predicate::str::contains("role: None"));

    shift(&roster)
        .args(["add-employee", "--name", "BoBaker", "--email", "bo@example.com", "-r", "tutor", "-m", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID: 2"));

    shift(&roster)
        .arg("list-employees")
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tAdaLovelace\tada@example.com\trole: None\tmax hours: 20"))
        .stdout(predicate::str::contains("2\tBoBaker\tbo@example.com\trole: tutor\tmax hours: 12"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn roster_path_from_environment() {
    let roster = scratch_roster("env-roster");

    Command::cargo_bin("shift")
        .unwrap()
        .env("SHIFT_ROSTER", &roster)
        .args(["add-employee", "--name", "Ada", "--email", "ada@example.com"])
        .assert()
        .success();

    assert!(roster.exists(), "roster should be written to $SHIFT_ROSTER");
    let _ = std::fs::remove_file(&roster);
}

#[test]
fn add_employee_with_taken_email_fails() {
    let roster = fixture_copy("taken-email");

    shift(&roster)
        .args(["add-employee", "--name", "AdaTwo", "--email", "ada@example.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("email ada@example.com is already in use"));

    shift(&roster)
        .arg("list-employees")
        .assert()
        .success()
        .stdout(predicate::str::contains("AdaTwo").not());

    let _ = std::fs::remove_file(&roster);
}

// ─────────────────────────────────────────────────────────────────────────────
// Unavailabilities
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn add_and_list_unavailability_in_local_time() {
    let roster = fixture_copy("unavailability");

    shift(&roster)
        .args([
            "add-unavailability",
            "--employee-id", "1",
            "--start", "2025-08-27 09:00",
            "--end", "2025-08-27 12:00",
            "--note", "dentist",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(id: 1) for employee Ada (id: 1)"));

    shift(&roster)
        .args(["list-unavailabilities", "--employee-id", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-08-27 09:00 -> 2025-08-27 12:00\tnote: dentist"));

    shift(&roster)
        .args(["list-unavailabilities", "--employee-id", "1", "-z", "UTC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-08-27 13:00 -> 2025-08-27 16:00"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn overlapping_unavailability_needs_allow_overlap() {
    let roster = fixture_copy("overlap");
    let add = |extra: &[&str]| {
        let mut cmd = shift(&roster);
        cmd.args([
            "add-unavailability",
            "--employee-id", "2",
            "--start", "2025-08-27 09:00",
            "--end", "2025-08-27 10:00",
        ])
        .args(extra);
        cmd
    };

    add(&[]).assert().success();
    add(&[])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlaps with existing unavailability"));
    add(&["--allow-overlap"]).assert().success();

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn unavailability_for_unknown_employee_fails() {
    let roster = fixture_copy("unknown-employee");

    shift(&roster)
        .args([
            "add-unavailability",
            "--employee-id", "99",
            "--start", "2025-08-27 09:00",
            "--end", "2025-08-27 10:00",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Employee not found at employee ID: 99"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn list_unavailabilities_range_needs_both_bounds() {
    let roster = fixture_copy("half-range");

    shift(&roster)
        .args(["list-unavailabilities", "--employee-id", "1", "--start", "2025-08-27 09:00"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--end"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn list_unavailabilities_when_none() {
    let roster = fixture_copy("none");

    shift(&roster)
        .args(["list-unavailabilities", "--employee-id", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unavailabilities found"));

    let _ = std::fs::remove_file(&roster);
}

// ─────────────────────────────────────────────────────────────────────────────
// Generate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn generate_prints_balanced_json() {
    let roster = fixture_copy("generate");

    let output = shift(&roster)
        .args([
            "generate",
            "--start", "2024-01-01T09:00:00Z",
            "--end", "2024-01-01T13:00:00Z",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries: serde_json::Value = serde_json::from_slice(&output).expect("stdout must be JSON");
    let owners: Vec<i64> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["employee_id"].as_i64().unwrap())
        .collect();
    assert_eq!(owners, vec![1, 2, 1, 2]);
    assert_eq!(entries[0]["start"], "2024-01-01T09:00:00Z");
    assert_eq!(entries[3]["end"], "2024-01-01T13:00:00Z");

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_rejects_floating_times_without_zone() {
    let roster = fixture_copy("floating");

    shift(&roster)
        .args(["generate", "--start", "2024-01-01 09:00", "--end", "2024-01-01T13:00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid window"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_reads_floating_times_in_zone() {
    let roster = fixture_copy("zoned");

    shift(&roster)
        .args([
            "generate",
            "--start", "2024-01-01 09:00",
            "--end", "2024-01-01 10:00",
            "-z", "America/New_York",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01T14:00:00Z"))
        .stdout(predicate::str::contains("2024-01-01T15:00:00Z"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_reports_unschedulable_slot() {
    let roster = fixture_copy("infeasible");

    // Employee 2 has a 2-hour ceiling.
    shift(&roster)
        .args([
            "generate",
            "--start", "2024-01-01T09:00:00Z",
            "--end", "2024-01-01T12:00:00Z",
            "--employee-id", "2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to find an available employee"))
        .stderr(predicate::str::contains("2024-01-01T11:00:00+00:00"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_rejects_non_positive_slot() {
    let roster = fixture_copy("bad-slot");

    shift(&roster)
        .args([
            "generate",
            "--start", "2024-01-01T09:00:00Z",
            "--end", "2024-01-01T11:00:00Z",
            "--slot-minutes", "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("slot duration must be positive"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_rejects_slot_out_of_range() {
    let roster = fixture_copy("huge-slot");

    shift(&roster)
        .args([
            "generate",
            "--start", "2024-01-01T09:00:00Z",
            "--end", "2024-01-01T11:00:00Z",
            "--slot-minutes", "9223372036854775807",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("slot length out of range"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_selects_repeated_employee_once() {
    let roster = fixture_copy("repeated-id");

    // Bo's 2-hour ceiling covers the window exactly once.
    let output = shift(&roster)
        .args([
            "generate",
            "--start", "2024-01-01T09:00:00Z",
            "--end", "2024-01-01T11:00:00Z",
            "--employee-id", "2",
            "--employee-id", "2",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries: serde_json::Value = serde_json::from_slice(&output).expect("stdout must be JSON");
    assert_eq!(entries.as_array().map(Vec::len), Some(1));
    assert_eq!(entries[0]["employee_id"], 2);
    assert_eq!(entries[0]["end"], "2024-01-01T11:00:00Z");

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_on_empty_roster_fails() {
    let roster = scratch_roster("empty");

    shift(&roster)
        .args(["generate", "--start", "2024-01-01T09:00:00Z", "--end", "2024-01-01T10:00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one employee"));
}

#[test]
fn generate_commit_stores_schedules() {
    let roster = fixture_copy("commit");
    let window = ["--start", "2024-01-01T09:00:00Z", "--end", "2024-01-01T10:00:00Z"];

    shift(&roster)
        .arg("generate")
        .args(window)
        .arg("--commit")
        .assert()
        .success();

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&roster).unwrap()).unwrap();
    let schedules = stored["employees"][0]["schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0]["start"], "2024-01-01T09:00:00Z");

    // Ada is now busy 09-10, so the same window goes to Bo.
    shift(&roster)
        .arg("generate")
        .args(window)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"employee_id\": 2"));

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn generate_writes_output_file() {
    let roster = fixture_copy("output-file");
    let output_path = std::env::temp_dir().join("shift-cli-test-output.json");
    let _ = std::fs::remove_file(&output_path);

    shift(&roster)
        .args(["generate", "--start", "2024-01-01T09:00:00Z", "--end", "2024-01-01T10:00:00Z", "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert!(content.contains("\"employee_id\": 1"));

    let _ = std::fs::remove_file(&output_path);
    let _ = std::fs::remove_file(&roster);
}
