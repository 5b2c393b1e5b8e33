//! Integration tests for the PVDIFF CLI tool.
//!
//! These tests run the binary end to end against the snapshots in
//! `tests/fixtures`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to create a Command for the pvdiff binary
fn pvdiff() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pvdiff"))
}

#[test]
fn test_identical_snapshots_exit_0() {
    pvdiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_changed_snapshots_exit_1() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("• status: 1 → 0"))
        .stdout(predicate::str::contains(r#"• categories: "1, 2" → "2, 1""#))
        .stdout(predicate::str::contains(r#"• price (USD) - web: "100" → "150""#))
        .stdout(predicate::str::contains(
            r#"• name - web/en: "Shoe" → "Running Shoe""#,
        ))
        .stdout(predicate::str::contains("Summary: 4 changes"));
}

#[test]
fn test_removed_locale_not_reported() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("web/fr").not())
        .stdout(predicate::str::contains("visible").not())
        .stdout(predicate::str::contains("weight").not());
}

#[test]
fn test_json_output_format() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--format=json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""price (USD) - web": {"#))
        .stdout(predicate::str::contains(r#""name": "price (USD) - web""#))
        .stdout(predicate::str::contains(r#""old": "100""#))
        .stdout(predicate::str::contains(r#""new": "150""#));
}

#[test]
fn test_json_and_yaml_snapshots_compare_equal() {
    pvdiff()
        .arg("tests/fixtures/product_new.json")
        .arg("tests/fixtures/product_new.yaml")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_file_not_found_exit_2() {
    pvdiff()
        .arg("tests/fixtures/nonexistent.json")
        .arg("tests/fixtures/identical_1.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("old snapshot"));
}

#[test]
fn test_malformed_snapshot_exit_2() {
    pvdiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/malformed.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_undetectable_snapshot_exit_2() {
    pvdiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/garbage.txt")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Could not detect document format"));
}

#[test]
fn test_lenient_missing_old_snapshot() {
    pvdiff()
        .arg("tests/fixtures/nonexistent.json")
        .arg("tests/fixtures/identical_1.json")
        .arg("--lenient")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#"• sku: "" → "SHOE-1""#))
        .stdout(predicate::str::contains(r#"• categories: "" → "1, 2""#));
}

#[test]
fn test_lenient_malformed_on_both_sides() {
    pvdiff()
        .arg("tests/fixtures/malformed.json")
        .arg("tests/fixtures/malformed.json")
        .arg("--lenient")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_ignore_pattern() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--format=plain")
        .arg("--ignore=channel_locale_specific.**")
        .arg("--ignore=categories")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("name - web/en").not())
        .stdout(predicate::str::contains("categories").not())
        .stdout(predicate::str::contains("Summary: 2 changes"));
}

#[test]
fn test_only_pattern_filtering_everything_exits_0() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--only=common.sku")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_invalid_pattern_exit_2() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--ignore=common..sku")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("empty segment"));
}

#[test]
fn test_stdin_snapshot() {
    pvdiff()
        .arg("-")
        .arg("tests/fixtures/identical_1.json")
        .write_stdin(r#"{"common": {"sku": "SHOE-1", "weight": 10}, "categories": [1, 2]}"#)
        .assert()
        .code(0);
}

#[test]
fn test_both_stdin_rejected() {
    pvdiff().arg("-").arg("-").assert().code(2);
}

#[test]
fn test_quiet_flag() {
    pvdiff()
        .arg("tests/fixtures/product_old.json")
        .arg("tests/fixtures/product_new.json")
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn test_verbose_flag_logs_to_stderr() {
    pvdiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .arg("--verbose")
        .env_remove("RUST_LOG")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("computed product values diff"));
}

#[test]
fn test_max_value_length() {
    let mut old = NamedTempFile::new().unwrap();
    writeln!(old, r#"{{"common": {{"description": "short"}}}}"#).unwrap();
    let mut new = NamedTempFile::new().unwrap();
    writeln!(
        new,
        r#"{{"common": {{"description": "a rather long description of the shoe"}}}}"#
    )
    .unwrap();

    pvdiff()
        .arg(old.path())
        .arg(new.path())
        .arg("--format=plain")
        .arg("--max-value-length=10")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""a rath..."#));
}

#[test]
fn test_help_flag() {
    pvdiff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Field-level audit diff"))
        .stdout(predicate::str::contains("OLD"))
        .stdout(predicate::str::contains("NEW"));
}

#[test]
fn test_version_flag() {
    pvdiff()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pvdiff"));
}
