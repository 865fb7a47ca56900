#![cfg(unix)]

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;

fn record(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("capture should print a JSON record")
}

#[test]
fn test_capture_success() {
    let (mut cmd, _dir) = bgh_with_config("");
    let assert = cmd.args(["capture", "--", "echo", "hi"]).assert().success();
    let json = record(&assert.get_output().stdout);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["value"], "hi");
    assert_eq!(json["func_name"], "run_output");
    assert_eq!(json["args"][0], "echo hi");
}

#[test]
fn test_capture_failure_record_and_logfile() {
    let (mut cmd, dir) = bgh_with_config("");
    let log = dir.path().join("failures.log");
    let assert = cmd
        .arg("capture")
        .arg("--logfile")
        .arg(&log)
        .args(["--", "echo nope; exit 2"])
        .assert()
        .code(1);

    let json = record(&assert.get_output().stdout);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error_type"], "ExternalCommand");
    assert!(json["error_value"].as_str().unwrap().contains("Status: 2"));
    assert!(json["time_epoch"].as_f64().unwrap() > 0.0);
    assert!(!json["fqdn"].as_str().unwrap().is_empty());

    let logged = fs::read_to_string(&log).unwrap();
    assert!(logged.contains("run_output(echo nope; exit 2)"));
}

#[test]
fn test_capture_verbose_trace_goes_to_stderr() {
    let (mut cmd, _dir) = bgh_with_config("");
    cmd.args(["capture", "--verbose-trace", "--", "exit 5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("=".repeat(70)));
}
