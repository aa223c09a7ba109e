//! Integration tests for the `fibrust` CLI binary.
//!
//! These run the actual built binary and check its output and exit
//! codes, rather than calling `fibrust-core` directly.

use assert_cmd::Command;
use predicates::prelude::*;

fn fibrust_cmd() -> Command {
    Command::cargo_bin("fibrust").unwrap()
}

#[test]
fn cli_calculates_fibonacci_10() {
    fibrust_cmd().arg("10").assert().success().stdout(predicate::str::contains("F(10)"));
}

#[test]
fn cli_calculates_fibonacci_0() {
    fibrust_cmd().arg("0").assert().success().stdout(predicate::str::contains("F(0)"));
}

#[test]
fn cli_fast_doubling_algorithm() {
    fibrust_cmd()
        .args(["100", "-a", "fast-doubling"])
        .assert()
        .success()
        .stdout(predicate::str::contains("F(100)"));
}

#[test]
fn cli_matrix_exp_algorithm() {
    fibrust_cmd()
        .args(["100", "--algorithm", "matrix-exp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("F(100)"));
}

#[test]
fn cli_fft_always_algorithm() {
    fibrust_cmd()
        .args(["100", "-a", "fft-always"])
        .assert()
        .success()
        .stdout(predicate::str::contains("F(100)"));
}

#[test]
fn cli_summary_flag_shows_digit_count_not_full_value() {
    fibrust_cmd()
        .args(["1000", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decimal digits"))
        .stdout(predicate::str::contains("209")); // F(1000) has 209 decimal digits
}

#[test]
fn cli_summary_short_flag() {
    fibrust_cmd().args(["100", "-s"]).assert().success().stdout(predicate::str::contains("decimal digits"));
}

#[test]
fn cli_prints_known_value_without_summary() {
    fibrust_cmd()
        .arg("20")
        .assert()
        .success()
        .stdout(predicate::str::contains("6765"));
}

#[test]
fn cli_help_displays() {
    fibrust_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Computes F(n)"))
        .stdout(predicate::str::contains("--algorithm"))
        .stdout(predicate::str::contains("--summary"));
}

#[test]
fn cli_version_displays() {
    fibrust_cmd().arg("--version").assert().success().stdout(predicate::str::contains("fibrust"));
}

#[test]
fn cli_missing_argument_fails() {
    fibrust_cmd().assert().failure();
}

#[test]
fn cli_invalid_algorithm_fails() {
    fibrust_cmd().args(["100", "-a", "not-a-real-algorithm"]).assert().failure();
}
