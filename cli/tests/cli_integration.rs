//! Integration tests for the `lunac` CLI.
//!
//! Spawns the compiled binary and checks behavior through stdout, stderr,
//! and exit codes rather than calling into the library directly.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn lunac() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("lunac"))
}

#[test]
fn fails_when_file_missing() {
    let mut cmd = lunac();
    cmd.arg("this-file-does-not-exist.lun");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn fails_when_no_source_given() {
    let mut cmd = lunac();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("supply a source path"));
}

#[test]
fn until_cmd_exits_zero_without_running_anything() {
    let mut cmd = lunac();
    cmd.arg("-c").arg("n = 1 +").arg("--until").arg("cmd");
    cmd.assert().success();
}

#[test]
fn until_ast_succeeds_on_well_formed_input() {
    let mut cmd = lunac();
    cmd.arg("-c")
        .arg("n = 4\nwhile n > 0: n = n - 1")
        .arg("--until")
        .arg("ast");
    cmd.assert().success();
}

#[test]
fn pretty_print_reconstructs_the_assignment() {
    let mut cmd = lunac();
    cmd.arg("-c").arg("n = 3").arg("-P").arg("--until").arg("ast");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("n = 3"));
}

#[test]
fn list_passes_prints_phase_and_pass_names() {
    let mut cmd = lunac();
    cmd.arg("-L");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("prelex"))
        .stdout(predicate::str::contains("sem"));
}

#[test]
fn syntax_error_exits_nonzero_with_a_rendered_diagnostic() {
    let mut cmd = lunac();
    cmd.arg("-c").arg("n = 1 +");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("<inline>"));
}

#[test]
fn report_vm_usage_prints_step_count() {
    let mut cmd = lunac();
    cmd.arg("-c").arg("n = 3").arg("-r");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("VM steps"));
}

#[test]
fn shows_version() {
    let mut cmd = lunac();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
