#![cfg(unix)]

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_run_exit_code_is_propagated() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["run", "--", "exit 3"]).assert().code(3);
}

#[test]
fn test_run_timeout_exits_124() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["run", "--timeout", "0.3", "--", "sleep", "5"])
        .assert()
        .code(124);
}

#[test]
fn test_run_timeout_with_exception_is_an_error() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["run", "--exception", "--timeout", "0.3", "--", "sleep", "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timed out"));
}

#[test]
fn test_run_or_die() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["run", "--or-die", "--", "exit 4"]).assert().code(4);
}

#[test]
fn test_run_show_echoes_command() {
    let (mut cmd, _dir) = bgh_with_config("[exec]\nshow_commands = true\n");
    cmd.args(["run", "--", "echo", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$ echo hello").and(predicate::str::contains("hello")));
}

#[test]
fn test_output_merges_stderr() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["output", "--", "echo out; echo err >&2"])
        .assert()
        .success()
        .stdout("out\nerr\n");
}

#[test]
fn test_output_failure_with_exception() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["output", "--exception", "--", "echo broken; exit 2"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("External command failed")
                .and(predicate::str::contains("Status: 2"))
                .and(predicate::str::contains("broken")),
        );
}

#[test]
fn test_output_failure_without_exception_prints_output() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["output", "--", "echo partial; exit 2"])
        .assert()
        .success()
        .stdout("partial\n");
}

#[test]
fn test_bg_runs_all_commands() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["bg", "exit 0", "sleep 0.2"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[ok] exit 0 (exit 0)")
                .and(predicate::str::contains("[ok] sleep 0.2 (exit 0)")),
        );
}

#[test]
fn test_bg_reports_failures() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["bg", "true", "exit 3"])
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("[ok] true")
                .and(predicate::str::contains("[error] exit 3: External command failed")),
        );
}
