//! # bghelper Background Command
//!
//! File: cli/src/commands/bg.rs
//!
//! `bgh bg` starts every given command as a background task, waits for all of
//! them and prints one summary line per command.
//!
//! ```bash
//! bgh bg 'make docs' 'make lint' 'cargo test'
//! ```
//!
use super::{parse_seconds, run_options};
use bghelper::common::task::{CallResult, SimpleBackgroundTask};
use bghelper::core::{config::Config, error::Result};
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Run several commands concurrently in background tasks")]
pub struct BgArgs {
    /// Commands to run; quote each one.
    #[arg(required = true, num_args = 1..)]
    commands: Vec<String>,

    /// Per-command timeout in seconds.
    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,
}

/// Exits 1 if any command failed.
pub async fn handle_bg(args: BgArgs, config: &Config) -> Result<i32> {
    let opts = run_options(config, args.timeout).exception(true);
    let tasks = args
        .commands
        .iter()
        .map(|cmd| SimpleBackgroundTask::shell_with(cmd.clone(), opts.clone()))
        .collect::<Result<Vec<_>>>()?;
    info!("Started {} background task(s)", tasks.len());

    let results = tokio::task::spawn_blocking(move || {
        tasks
            .into_iter()
            .map(SimpleBackgroundTask::join)
            .collect::<Result<Vec<_>>>()
    })
    .await??;

    let mut failed = 0;
    for (cmd, result) in args.commands.iter().zip(&results) {
        println!("{}", summary_line(cmd, result));
        if !result.is_ok() {
            failed += 1;
        }
    }
    if failed > 0 {
        warn!("{} of {} background task(s) failed", failed, results.len());
        return Ok(1);
    }
    Ok(0)
}

fn summary_line(cmd: &str, result: &CallResult<i32>) -> String {
    match (&result.value, &result.failure) {
        (Some(code), _) => format!("[ok] {} (exit {})", cmd, code),
        (None, Some(failure)) => format!("[error] {}: {}", cmd, first_line(&failure.error_value)),
        (None, None) => format!("[error] {}", cmd),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bghelper::common::task::{CallFailure, CallStatus};

    #[test]
    fn test_bg_args_parsing() {
        let args = BgArgs::try_parse_from(["bg", "sleep 1", "make docs"]).unwrap();
        assert_eq!(args.commands, vec!["sleep 1", "make docs"]);
        assert!(BgArgs::try_parse_from(["bg"]).is_err());
    }

    #[test]
    fn test_summary_line() {
        let ok = CallResult {
            func_name: "run".to_string(),
            args: vec!["true".to_string()],
            status: CallStatus::Ok,
            value: Some(0),
            failure: None,
        };
        assert_eq!(summary_line("true", &ok), "[ok] true (exit 0)");

        let failed = CallResult {
            value: None,
            status: CallStatus::Error,
            failure: Some(CallFailure {
                traceback_string: String::new(),
                error_type: "ExternalCommand".to_string(),
                error_value: "External command failed: false, Status: 1, Output:\n".to_string(),
                fqdn: "host".to_string(),
                time_epoch: 0.0,
                time_string: String::new(),
            }),
            ..ok
        };
        assert_eq!(
            summary_line("false", &failed),
            "[error] false: External command failed: false, Status: 1, Output:"
        );
    }
}
