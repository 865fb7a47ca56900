//! # bghelper Run Command
//!
//! File: cli/src/commands/run.rs
//!
//! `bgh run` executes a command through the shell with the terminal attached
//! and exits with the command's exit code.
//!
//! ```bash
//! bgh run -- make test
//! bgh run --timeout 5 --stderr-to-stdout -- ./flaky.sh
//! bgh run --or-die -- 'exit 3'    # terminates bgh with status 3
//! ```
//!
use super::{parse_seconds, run_options};
use bghelper::common::process::{run, run_or_die};
use bghelper::core::{config::Config, error::Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Run a shell command and exit with its status")]
pub struct RunArgs {
    /// Command line, joined with spaces and passed to the shell.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    /// Kill the command after this many seconds (exit status 124).
    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Send the command's stderr to stdout.
    #[arg(long)]
    stderr_to_stdout: bool,

    /// Echo the command before running it.
    #[arg(long)]
    show: bool,

    /// Treat a non-zero exit or a timeout as an error.
    #[arg(long)]
    exception: bool,

    /// Terminate immediately with the command's status when it fails.
    #[arg(long)]
    or_die: bool,
}

pub async fn handle_run(args: RunArgs, config: &Config) -> Result<i32> {
    let cmd = args.command.join(" ");
    let opts = run_options(config, args.timeout)
        .show(args.show || config.exec.show_commands)
        .stderr_to_stdout(args.stderr_to_stdout)
        .exception(args.exception);
    info!("Running '{}'", cmd);

    if args.or_die {
        run_or_die(&cmd, &opts).await?;
        return Ok(0);
    }
    run(&cmd, &opts).await
}
