//! # bghelper Output Command
//!
//! File: cli/src/commands/output.rs
//!
//! `bgh output` runs a command, captures stdout and stderr together and prints
//! the result.
//!
//! ```bash
//! bgh output -- git log -1 --format=%H
//! bgh output --exception --timeout 10 -- docker ps
//! ```
//!
use super::{parse_seconds, run_options};
use bghelper::common::process::run_output;
use bghelper::core::{config::Config, error::Result};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Run a shell command and print its combined output")]
pub struct OutputArgs {
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    /// Fail after this many seconds.
    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Keep leading and trailing whitespace.
    #[arg(long)]
    no_strip: bool,

    /// Fail (exit 1) when the command exits non-zero.
    #[arg(long)]
    exception: bool,

    #[arg(long)]
    show: bool,
}

pub async fn handle_output(args: OutputArgs, config: &Config) -> Result<i32> {
    let cmd = args.command.join(" ");
    let opts = run_options(config, args.timeout)
        .show(args.show || config.exec.show_commands)
        .strip(!args.no_strip)
        .exception(args.exception);
    let output = run_output(&cmd, &opts).await?;
    if args.no_strip {
        print!("{}", output);
    } else if !output.is_empty() {
        println!("{}", output);
    }
    Ok(0)
}
