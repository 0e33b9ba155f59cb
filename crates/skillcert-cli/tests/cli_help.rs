use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_journey_commands() {
    cargo_bin_cmd!("skillcert")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("pay"))
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("certificate"))
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn test_admin_help_shows_subcommands() {
    cargo_bin_cmd!("skillcert")
        .args(["admin", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("analytics"))
        .stdout(predicate::str::contains("users"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_unknown_language_is_rejected() {
    cargo_bin_cmd!("skillcert")
        .args(["language", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected en or ur"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("skillcert")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
