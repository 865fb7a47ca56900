//! # bghelper Ps Command
//!
//! File: cli/src/commands/ps.rs
//!
//! `bgh ps [PATTERN]` lists processes, optionally only those whose command line
//! contains `PATTERN`.
//!
use bghelper::common::ps::{ps_find, ps_output, ProcessInfo};
use bghelper::core::{config::Config, error::Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "List processes, optionally filtered by command line")]
pub struct PsArgs {
    pattern: Option<String>,

    #[arg(long)]
    case_sensitive: bool,
}

/// Exits 1 when a pattern matched nothing.
pub async fn handle_ps(args: PsArgs, _config: &Config) -> Result<i32> {
    let processes = match &args.pattern {
        Some(pattern) => ps_find(pattern, !args.case_sensitive).await?,
        None => ps_output().await?,
    };
    println!("{:>7} {:>7} {:<12} COMMAND", "PID", "PPID", "USER");
    for process in &processes {
        println!("{}", format_row(process));
    }
    Ok(if args.pattern.is_some() && processes.is_empty() { 1 } else { 0 })
}

fn format_row(p: &ProcessInfo) -> String {
    format!("{:>7} {:>7} {:<12} {}", p.pid, p.ppid, p.user, p.command)
}
