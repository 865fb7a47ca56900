//! # bghelper Capture Command
//!
//! File: cli/src/commands/capture.rs
//!
//! `bgh capture` runs a command inside an error-capture call and prints the
//! resulting record as JSON. A failing command yields `"status": "error"`
//! with the error details instead of an error exit from `bgh` itself.
//!
//! ```bash
//! bgh capture -- curl -fsS http://localhost:8080/health
//! ```
//!
use super::{parse_seconds, run_options};
use anyhow::Context;
use bghelper::common::process::run_output;
use bghelper::common::task::Call;
use bghelper::core::{config::Config, error::Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Run a command and print a JSON record of the outcome")]
pub struct CaptureArgs {
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Append failure traces to this file.
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Print the separator and trace to stderr on failure.
    #[arg(long)]
    verbose_trace: bool,
}

/// Exits 0 when the command succeeded and 1 otherwise.
pub async fn handle_capture(args: CaptureArgs, config: &Config) -> Result<i32> {
    let cmd = args.command.join(" ");
    let opts = run_options(config, args.timeout).exception(true);

    let mut call = Call::new("run_output")
        .args([cmd.clone()])
        .verbose(args.verbose_trace);
    if let Some(path) = args.logfile {
        call = call.logfile(path);
    }
    let result = call.run_async(run_output(&cmd, &opts)).await;

    let json = serde_json::to_string_pretty(&result).context("Failed to serialize call record")?;
    println!("{}", json);
    Ok(if result.is_ok() { 0 } else { 1 })
}
