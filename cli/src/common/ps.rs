//! # bghelper Process Listing (`common::ps`)
//!
//! File: cli/src/common/ps.rs
//!
//! Lists running processes with `ps -eo pid=,ppid=,user=,args=` (headerless
//! output, supported by both procps and BSD `ps`) and filters them by command line.
//!
use crate::common::process::{run_output, RunOptions};
use crate::core::error::Result;
use tracing::debug;

const PS_COMMAND: &str = "ps -eo pid=,ppid=,user=,args=";

/// One row of `ps` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub ppid: u32,
    pub user: String,
    /// Full command line, spacing preserved.
    pub command: String,
}

/// All processes visible to the current user.
pub async fn ps_output() -> Result<Vec<ProcessInfo>> {
    let output = run_output(PS_COMMAND, &RunOptions::new().exception(true).strip(false)).await?;
    Ok(parse_ps_output(&output))
}

/// Processes whose command line contains `pattern`, excluding this process
/// and its children (the shell and `ps` run for the lookup).
pub async fn ps_find(pattern: &str, ignore_case: bool) -> Result<Vec<ProcessInfo>> {
    let found = matching(ps_output().await?, pattern, ignore_case, std::process::id());
    debug!("{} process(es) match '{}'", found.len(), pattern);
    Ok(found)
}

fn matching(
    processes: Vec<ProcessInfo>,
    pattern: &str,
    ignore_case: bool,
    own_pid: u32,
) -> Vec<ProcessInfo> {
    let needle = if ignore_case {
        pattern.to_lowercase()
    } else {
        pattern.to_string()
    };
    processes
        .into_iter()
        .filter(|p| p.pid != own_pid && p.ppid != own_pid)
        .filter(|p| {
            if ignore_case {
                p.command.to_lowercase().contains(&needle)
            } else {
                p.command.contains(&needle)
            }
        })
        .collect()
}

/// Parses `pid ppid user args...` rows. Malformed rows are skipped.
pub fn parse_ps_output(output: &str) -> Vec<ProcessInfo> {
    output
        .lines()
        .filter_map(|line| {
            let (pid, rest) = next_field(line)?;
            let (ppid, rest) = next_field(rest)?;
            let (user, rest) = next_field(rest)?;
            Some(ProcessInfo {
                pid: pid.parse().ok()?,
                ppid: ppid.parse().ok()?,
                user: user.to_string(),
                command: rest.trim().to_string(),
            })
        })
        .collect()
}

fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
