//! # bghelper SSH Helpers (`common::ssh`)
//!
//! File: cli/src/common/ssh.rs
//!
//! Runs commands on remote hosts through the `ssh` client. Host aliases, keys
//! and agent configuration are left entirely to `~/.ssh/config` and ssh itself.
//!
use crate::common::process::{quote, run, run_capture, run_output, RunOptions};
use crate::core::error::Result;
use std::path::PathBuf;
use tracing::debug;

/// Connection options turned into `ssh` flags.
#[derive(Debug, Clone, Default)]
pub struct SshOptions {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<PathBuf>,
    /// Never prompt for passwords or host key confirmation.
    pub batch_mode: bool,
    /// Seconds to wait for the connection.
    pub connect_timeout: Option<u32>,
}

/// Builds `ssh [flags] [user@]host '<remote_cmd>'`.
pub fn ssh_command(host: &str, remote_cmd: &str, opts: &SshOptions) -> String {
    let mut parts = vec!["ssh".to_string()];
    if let Some(port) = opts.port {
        parts.push(format!("-p {}", port));
    }
    if let Some(identity) = &opts.identity_file {
        parts.push(format!("-i {}", quote(&identity.to_string_lossy())));
    }
    if opts.batch_mode {
        parts.push("-o BatchMode=yes".to_string());
    }
    if let Some(secs) = opts.connect_timeout {
        parts.push(format!("-o ConnectTimeout={}", secs));
    }
    let target = match &opts.user {
        Some(user) => format!("{}@{}", user, host),
        None => host.to_string(),
    };
    parts.push(quote(&target));
    if !remote_cmd.is_empty() {
        parts.push(quote(remote_cmd));
    }
    parts.join(" ")
}

/// Runs `remote_cmd` on `host` with the terminal attached; returns the exit code.
pub async fn ssh_run(
    host: &str,
    remote_cmd: &str,
    ssh_opts: &SshOptions,
    opts: &RunOptions,
) -> Result<i32> {
    run(&ssh_command(host, remote_cmd, ssh_opts), opts).await
}

/// Runs `remote_cmd` on `host` and returns its combined output.
pub async fn ssh_output(
    host: &str,
    remote_cmd: &str,
    ssh_opts: &SshOptions,
    opts: &RunOptions,
) -> Result<String> {
    run_output(&ssh_command(host, remote_cmd, ssh_opts), opts).await
}

/// Returns `true` if a non-interactive connection to `host` succeeds.
pub async fn ssh_ok(host: &str, ssh_opts: &SshOptions) -> Result<bool> {
    let check = SshOptions {
        batch_mode: true,
        connect_timeout: ssh_opts.connect_timeout.or(Some(5)),
        ..ssh_opts.clone()
    };
    let captured = run_capture(&ssh_command(host, "true", &check), &RunOptions::new()).await?;
    if !captured.success() {
        debug!("ssh check of '{}' failed: {}", host, captured.output);
    }
    Ok(captured.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_command_plain() {
        assert_eq!(
            ssh_command("build-box", "uptime", &SshOptions::default()),
            "ssh build-box uptime"
        );
    }

    #[test]
    fn test_ssh_command_with_options() {
        let opts = SshOptions {
            user: Some("deploy".into()),
            port: Some(2222),
            identity_file: None,
            batch_mode: true,
            connect_timeout: Some(3),
        };
        assert_eq!(
            ssh_command("10.0.0.5", "ls -la /srv", &opts),
            "ssh -p 2222 -o BatchMode=yes -o ConnectTimeout=3 deploy@10.0.0.5 'ls -la /srv'"
        );
    }

    #[test]
    fn test_ssh_command_without_remote_cmd() {
        assert_eq!(ssh_command("host", "", &SshOptions::default()), "ssh host");
    }
}
