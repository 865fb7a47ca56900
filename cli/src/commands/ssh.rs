//! # bghelper SSH Command
//!
//! File: cli/src/commands/ssh.rs
//!
//! `bgh ssh` runs a command on a remote host, or checks that it is reachable.
//!
//! ```bash
//! bgh ssh --user deploy web-1 -- systemctl status nginx
//! bgh ssh --check web-1
//! ```
//!
use super::{parse_seconds, run_options};
use bghelper::common::ssh::{ssh_ok, ssh_output, ssh_run, SshOptions};
use bghelper::core::{config::Config, error::Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Run a command on a remote host over ssh")]
pub struct SshArgs {
    host: String,

    /// Remote command. Without one, ssh opens a login shell.
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    #[arg(long, short)]
    user: Option<String>,

    #[arg(long, short)]
    port: Option<u16>,

    #[arg(long, short)]
    identity: Option<PathBuf>,

    /// Never prompt for passwords or host keys.
    #[arg(long)]
    batch: bool,

    #[arg(long)]
    connect_timeout: Option<u32>,

    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Capture and print the output instead of attaching the terminal.
    #[arg(long)]
    output: bool,

    /// Only check that a non-interactive connection succeeds.
    #[arg(long, conflicts_with_all = ["command", "output"])]
    check: bool,
}

impl SshArgs {
    fn ssh_options(&self) -> SshOptions {
        SshOptions {
            user: self.user.clone(),
            port: self.port,
            identity_file: self.identity.clone(),
            batch_mode: self.batch,
            connect_timeout: self.connect_timeout,
        }
    }
}

pub async fn handle_ssh(args: SshArgs, config: &Config) -> Result<i32> {
    let ssh_opts = args.ssh_options();
    if args.check {
        let ok = ssh_ok(&args.host, &ssh_opts).await?;
        println!("{}: {}", args.host, if ok { "reachable" } else { "unreachable" });
        return Ok(if ok { 0 } else { 1 });
    }

    let remote_cmd = args.command.join(" ");
    let opts = run_options(config, args.timeout);
    if args.output {
        let output = ssh_output(&args.host, &remote_cmd, &ssh_opts, &opts.exception(true)).await?;
        println!("{}", output);
        return Ok(0);
    }
    ssh_run(&args.host, &remote_cmd, &ssh_opts, &opts).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use bghelper::common::ssh::ssh_command;

    #[test]
    fn test_ssh_args_parsing() {
        let args = SshArgs::try_parse_from([
            "ssh", "--user", "deploy", "-p", "2222", "--batch", "10.0.0.5", "ls", "-la",
        ])
        .unwrap();
        assert_eq!(args.command, vec!["ls", "-la"]);
        assert_eq!(
            ssh_command(&args.host, &args.command.join(" "), &args.ssh_options()),
            "ssh -p 2222 -o BatchMode=yes deploy@10.0.0.5 'ls -la'"
        );
    }

    #[test]
    fn test_check_conflicts_with_command() {
        assert!(SshArgs::try_parse_from(["ssh", "--check", "web-1", "uptime"]).is_err());
        assert!(SshArgs::try_parse_from(["ssh", "--check", "web-1"]).unwrap().check);
    }
}
