//! # bghelper Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per `bgh` subcommand. Each defines a clap `...Args` struct and an
//! async `handle_...` function that takes the parsed arguments plus the loaded
//! [`Config`] and returns the exit code `bgh` should terminate with.
//!
//! ## Command Groups
//!
//! - `run`, `output`, `grep`: the execution primitives and output filtering
//! - `capture`, `bg`: the error-capture call and background tasks
//! - `docker`, `git`, `ssh`, `pip`, `ps`: the tool wrappers
//!
use bghelper::common::process::RunOptions;
use bghelper::core::config::Config;
use std::time::Duration;

pub mod bg;
pub mod capture;
pub mod docker;
pub mod git;
pub mod grep;
pub mod output;
pub mod pip;
pub mod ps;
pub mod run;
pub mod ssh;

/// Parses a positive number of seconds (fractions allowed) for `--timeout`.
pub fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be positive, got '{}'", value));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Parses `KEY=VALUE` for `--env`.
pub fn parse_key_val(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, val)| (key.to_string(), val.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", value))
}

/// Execution options from `[exec]`, with a `--timeout` override.
pub fn run_options(config: &Config, timeout: Option<Duration>) -> RunOptions {
    let opts = RunOptions::from_config(&config.exec);
    match timeout {
        Some(limit) => opts.timeout(limit),
        None => opts,
    }
}
