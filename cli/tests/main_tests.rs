mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_main_help_flag() {
    bgh_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("capture").and(predicate::str::contains("docker")));
}

#[test]
fn test_main_version_flag() {
    bgh_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_fails() {
    bgh_cmd().arg("frobnicate").assert().failure();
}

#[test]
fn test_invalid_config_is_reported() {
    let (mut cmd, _dir) = bgh_with_config("[exec]\nshell = \"\"\n");
    cmd.args(["run", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let (mut cmd, _dir) = bgh_with_config("[exec]\nshel = \"bash\"\n");
    cmd.args(["run", "true"]).assert().code(1);
}
