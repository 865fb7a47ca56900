//! # bghelper Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! The three command-execution primitives every other helper is built on. Each
//! takes a command *string*, hands it to a shell (`sh -c`, or `cmd /C` on
//! Windows) and differs only in what it gives back:
//!
//! - **`run`**: Streams output to the terminal and returns the exit code.
//! - **`run_output`**: Captures stdout and stderr together (or stdout alone,
//!   with `discard_stderr`) and returns the text.
//!   (`run_capture` returns the exit code alongside the text.)
//! - **`run_or_die`**: Like `run`, but a non-zero exit either becomes an error or
//!   terminates the current process with the same code.
//!
//! ## Error escalation
//!
//! `RunOptions::exception` decides whether a non-zero exit is reported as
//! `BgError::ExternalCommand` or returned as a plain value (the exit code, or the
//! captured output). Failure to spawn the shell is always an error.
//!
//! Timeouts kill the child. `run` returns [`TIMEOUT_EXIT_CODE`] unless
//! `exception` is set; `run_output` always fails with `BgError::Timeout`, since
//! there is no complete output to return.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bghelper::common::process::{self, RunOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> bghelper::core::error::Result<()> {
//! let code = process::run("make test", &RunOptions::new().show(true)).await?;
//!
//! let branch = process::run_output(
//!     "git rev-parse --abbrev-ref HEAD",
//!     &RunOptions::new().timeout(Duration::from_secs(5)),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
use crate::core::config::ExecConfig;
use crate::core::error::{BgError, Result};
use anyhow::{anyhow, Context};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, error, instrument, warn};

/// Exit code reported by `run` for a command killed after its timeout
/// (the same code GNU `timeout` uses).
pub const TIMEOUT_EXIT_CODE: i32 = 124;

#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "sh";

/// Options shared by the execution primitives.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Echo `$ <cmd>` before running.
    pub show: bool,
    /// Kill the command if it runs longer than this.
    pub timeout: Option<Duration>,
    /// Turn a non-zero exit (and, for `run`, a timeout) into an error.
    pub exception: bool,
    /// `run` only: send stderr to stdout.
    pub stderr_to_stdout: bool,
    /// `run_capture` / `run_output` only: return stdout alone. stderr is
    /// logged instead of being merged into the output.
    pub discard_stderr: bool,
    /// `run_output` only: trim leading and trailing whitespace.
    pub strip: bool,
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Text written to the command's stdin.
    pub stdin: Option<String>,
    /// Shell program. Defaults to `sh` (`cmd` on Windows).
    pub shell: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            show: false,
            timeout: None,
            exception: false,
            stderr_to_stdout: false,
            discard_stderr: false,
            strip: true,
            cwd: None,
            env: Vec::new(),
            stdin: None,
            shell: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded from the `[exec]` configuration section.
    pub fn from_config(config: &ExecConfig) -> Self {
        Self {
            show: config.show_commands,
            timeout: config.default_timeout(),
            shell: Some(config.shell.clone()),
            ..Self::default()
        }
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn maybe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn exception(mut self, exception: bool) -> Self {
        self.exception = exception;
        self
    }

    pub fn stderr_to_stdout(mut self, merge: bool) -> Self {
        self.stderr_to_stdout = merge;
        self
    }

    pub fn discard_stderr(mut self, discard: bool) -> Self {
        self.discard_stderr = discard;
        self
    }

    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    fn shell_program(&self) -> &str {
        self.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }

    fn uses_cmd_exe(&self) -> bool {
        let program = self.shell_program().to_ascii_lowercase();
        program == "cmd" || program.ends_with("cmd.exe")
    }
}

/// Runs `cmd` with output going straight to the terminal and returns its exit code.
///
/// A command killed by a signal reports the negated signal number.
///
/// # Errors
///
/// * `BgError::Spawn` - the shell could not be started.
/// * `BgError::ExternalCommand` - non-zero exit and `opts.exception`.
/// * `BgError::Timeout` - timeout elapsed and `opts.exception`.
#[instrument(level = "debug", skip(opts))]
pub async fn run(cmd: &str, opts: &RunOptions) -> Result<i32> {
    if opts.show {
        println!("\n$ {}", cmd);
    }
    let script = if opts.stderr_to_stdout {
        merge_stderr(cmd, opts)
    } else {
        cmd.to_string()
    };

    let mut command = shell_command(&script, opts);
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());
    command.stdin(stdin_mode(opts));

    let mut child = spawn(&mut command, cmd)?;
    feed_stdin(&mut child, opts);

    let status = match opts.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!("Command timed out after {:?}: {}", limit, cmd);
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill timed out command '{}': {}", cmd, e);
                }
                if opts.exception {
                    return Err(anyhow!(BgError::Timeout {
                        cmd: cmd.to_string(),
                        timeout: limit,
                    }));
                }
                return Ok(TIMEOUT_EXIT_CODE);
            }
        },
        None => child.wait().await,
    }
    .with_context(|| format!("Failed to wait for command '{}'", cmd))?;

    let code = exit_code(status);
    debug!("Command '{}' exited with {}", cmd, code);
    if code != 0 && opts.exception {
        return Err(anyhow!(BgError::ExternalCommand {
            cmd: cmd.to_string(),
            status: code,
            output: String::new(),
        }));
    }
    Ok(code)
}

/// Exit code and captured text of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs `cmd` and returns its exit code together with everything it wrote to
/// stdout and stderr (stdout alone with `opts.discard_stderr`).
/// `opts.exception` is not consulted here.
///
/// # Errors
///
/// * `BgError::Spawn` - the shell could not be started.
/// * `BgError::Timeout` - timeout elapsed.
#[instrument(level = "debug", skip(opts))]
pub async fn run_capture(cmd: &str, opts: &RunOptions) -> Result<CommandOutput> {
    if opts.show {
        println!("\n$ {}", cmd);
    }
    let script = if opts.discard_stderr {
        cmd.to_string()
    } else {
        merge_stderr(cmd, opts)
    };

    let mut command = shell_command(&script, opts);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.stdin(stdin_mode(opts));

    let mut child = spawn(&mut command, cmd)?;
    feed_stdin(&mut child, opts);

    let output = match opts.timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| {
                warn!("Command timed out after {:?}: {}", limit, cmd);
                anyhow!(BgError::Timeout {
                    cmd: cmd.to_string(),
                    timeout: limit,
                })
            })?,
        None => child.wait_with_output().await,
    }
    .with_context(|| format!("Failed to collect output of command '{}'", cmd))?;

    let code = exit_code(output.status);
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if opts.discard_stderr {
            if code == 0 {
                debug!("stderr of '{}': {}", cmd, stderr.trim_end());
            } else {
                warn!("stderr of '{}': {}", cmd, stderr.trim_end());
            }
        } else {
            // Only shell-level errors raised before the redirect can land here.
            text.push_str(&stderr);
        }
    }
    if opts.strip {
        text = text.trim().to_string();
    }

    debug!("Command '{}' exited with {}", cmd, code);
    Ok(CommandOutput { code, output: text })
}

/// Runs `cmd` and returns everything it wrote to stdout and stderr.
///
/// The output of a failing command is still returned unless `opts.exception`
/// is set, which lets callers inspect tool error messages.
///
/// # Errors
///
/// * `BgError::Spawn` - the shell could not be started.
/// * `BgError::ExternalCommand` - non-zero exit and `opts.exception`; carries the output.
/// * `BgError::Timeout` - timeout elapsed.
pub async fn run_output(cmd: &str, opts: &RunOptions) -> Result<String> {
    let CommandOutput { code, output } = run_capture(cmd, opts).await?;
    if code != 0 && opts.exception {
        return Err(anyhow!(BgError::ExternalCommand {
            cmd: cmd.to_string(),
            status: code,
            output,
        }));
    }
    Ok(output)
}

/// Runs `cmd`; on a non-zero exit either returns the error (`opts.exception`)
/// or exits the current process with the command's exit code.
pub async fn run_or_die(cmd: &str, opts: &RunOptions) -> Result<()> {
    let code = run(cmd, opts).await?;
    if code == 0 {
        return Ok(());
    }
    error!("Command '{}' failed with exit code {}, exiting.", cmd, code);
    std::process::exit(code);
}

/// Quotes `value` for safe interpolation into a POSIX shell command string.
pub fn quote(value: &str) -> String {
    match shlex::try_quote(value) {
        Ok(quoted) => quoted.into_owned(),
        // Only NUL bytes are rejected; they cannot reach a command line anyway.
        Err(_) => format!("'{}'", value.replace('\0', "").replace('\'', r"'\''")),
    }
}

fn shell_command(script: &str, opts: &RunOptions) -> Command {
    let mut command = Command::new(opts.shell_program());
    command.arg(if opts.uses_cmd_exe() { "/C" } else { "-c" });
    command.arg(script);
    if let Some(dir) = &opts.cwd {
        command.current_dir(dir);
    }
    command.envs(opts.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    command.kill_on_drop(true);
    command
}

fn merge_stderr(cmd: &str, opts: &RunOptions) -> String {
    if opts.uses_cmd_exe() {
        format!("({}) 2>&1", cmd)
    } else {
        format!("exec 2>&1; {}", cmd)
    }
}

fn stdin_mode(opts: &RunOptions) -> Stdio {
    if opts.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

fn spawn(command: &mut Command, cmd: &str) -> Result<Child> {
    debug!("Executing: {}", cmd);
    command.spawn().map_err(|source| {
        anyhow!(BgError::Spawn {
            cmd: cmd.to_string(),
            source,
        })
    })
}

// The write happens on its own task so a child that fills its stdout pipe
// before reading all of stdin cannot deadlock us.
fn feed_stdin(child: &mut Child, opts: &RunOptions) {
    let (Some(input), Some(mut stdin)) = (opts.stdin.clone(), child.stdin.take()) else {
        return;
    };
    tokio::spawn(async move {
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            debug!("Could not write stdin to child: {}", e);
        }
    });
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::tempdir;

    fn err_kind(err: &anyhow::Error) -> Option<&'static str> {
        err.downcast_ref::<BgError>().map(BgError::kind)
    }

    #[tokio::test]
    async fn test_run_returns_exit_code() {
        assert_eq!(run("true", &RunOptions::new()).await.unwrap(), 0);
        assert_eq!(run("exit 3", &RunOptions::new()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_exception_on_failure() {
        let err = run("exit 3", &RunOptions::new().exception(true))
            .await
            .unwrap_err();
        match err.downcast_ref::<BgError>() {
            Some(BgError::ExternalCommand { cmd, status, .. }) => {
                assert_eq!(cmd, "exit 3");
                assert_eq!(*status, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_timeout_returns_code_without_exception() {
        let start = Instant::now();
        let code = run("sleep 5", &RunOptions::new().timeout(Duration::from_millis(200)))
            .await
            .unwrap();
        assert_eq!(code, TIMEOUT_EXIT_CODE);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_run_timeout_with_exception() {
        let opts = RunOptions::new()
            .timeout(Duration::from_millis(200))
            .exception(true);
        let err = run("sleep 5", &opts).await.unwrap_err();
        assert_eq!(err_kind(&err), Some("Timeout"));
    }

    /// A shell that sends its own stdout and stderr to separate files, so the
    /// streams of an inherited-stdio `run` can be inspected.
    fn recording_shell(dir: &std::path::Path) -> RunOptions {
        use std::os::unix::fs::PermissionsExt;

        let shell = dir.join("recording-sh");
        std::fs::write(&shell, "#!/bin/sh\nexec /bin/sh \"$@\" >\"$BGH_OUT\" 2>\"$BGH_ERR\"\n")
            .unwrap();
        std::fs::set_permissions(&shell, std::fs::Permissions::from_mode(0o755)).unwrap();
        RunOptions::new()
            .shell(shell.to_string_lossy())
            .env("BGH_OUT", dir.join("out.txt").to_string_lossy())
            .env("BGH_ERR", dir.join("err.txt").to_string_lossy())
    }

    #[tokio::test]
    async fn test_run_stderr_to_stdout() {
        let dir = tempdir().unwrap();
        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();

        let opts = recording_shell(dir.path());
        assert_eq!(run("echo out; echo err >&2", &opts).await.unwrap(), 0);
        assert_eq!(read("out.txt"), "out\n");
        assert_eq!(read("err.txt"), "err\n");

        let merged = opts.stderr_to_stdout(true);
        assert_eq!(run("echo out; echo err >&2", &merged).await.unwrap(), 0);
        assert_eq!(read("out.txt"), "out\nerr\n");
        assert_eq!(read("err.txt"), "");
    }

    #[tokio::test]
    async fn test_run_feeds_stdin() {
        let dir = tempdir().unwrap();
        let opts = RunOptions::new().cwd(dir.path()).stdin("line one\nline two\n");
        assert_eq!(run("cat > got.txt", &opts).await.unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("got.txt")).unwrap(),
            "line one\nline two\n"
        );
    }

    #[tokio::test]
    async fn test_run_output_discard_stderr() {
        let opts = RunOptions::new().discard_stderr(true);
        let output = run_output("echo 'WARNING: noisy' >&2; echo kept", &opts)
            .await
            .unwrap();
        assert_eq!(output, "kept");
    }

    #[tokio::test]
    async fn test_run_reports_signal_as_negative() {
        assert_eq!(run("kill -9 $$", &RunOptions::new()).await.unwrap(), -9);
    }

    #[tokio::test]
    async fn test_run_output_merges_streams_and_strips() {
        let output = run_output("echo out; echo err 1>&2", &RunOptions::new())
            .await
            .unwrap();
        assert_eq!(output, "out\nerr");
    }

    #[tokio::test]
    async fn test_run_output_without_strip() {
        let output = run_output("echo hi", &RunOptions::new().strip(false))
            .await
            .unwrap();
        assert_eq!(output, "hi\n");
    }

    #[tokio::test]
    async fn test_run_output_returns_output_of_failed_command() {
        let output = run_output("echo oops; exit 1", &RunOptions::new())
            .await
            .unwrap();
        assert_eq!(output, "oops");

        let err = run_output("echo oops; exit 1", &RunOptions::new().exception(true))
            .await
            .unwrap_err();
        match err.downcast_ref::<BgError>() {
            Some(BgError::ExternalCommand { status, output, .. }) => {
                assert_eq!(*status, 1);
                assert_eq!(output, "oops");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_capture_keeps_exit_code() {
        let captured = run_capture("echo partial; exit 2", &RunOptions::new().exception(true))
            .await
            .unwrap();
        assert_eq!(
            captured,
            CommandOutput {
                code: 2,
                output: "partial".to_string()
            }
        );
        assert!(!captured.success());
    }

    #[tokio::test]
    async fn test_run_output_timeout_is_error() {
        let err = run_output("sleep 5", &RunOptions::new().timeout(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert_eq!(err_kind(&err), Some("Timeout"));
    }

    #[tokio::test]
    async fn test_run_output_feeds_stdin() {
        let output = run_output("tr a-z A-Z", &RunOptions::new().stdin("hello\nworld\n"))
            .await
            .unwrap();
        assert_eq!(output, "HELLO\nWORLD");
    }

    #[tokio::test]
    async fn test_run_output_cwd_and_env() {
        let dir = tempdir().unwrap();
        let opts = RunOptions::new()
            .cwd(dir.path())
            .env("BGH_TEST_VALUE", "forty two");
        let output = run_output("pwd; echo \"$BGH_TEST_VALUE\"", &opts)
            .await
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            std::fs::canonicalize(lines[0]).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
        assert_eq!(lines[1], "forty two");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_error() {
        let opts = RunOptions::new().shell("/nonexistent/bghelper-shell");
        let err = run("true", &opts).await.unwrap_err();
        assert_eq!(err_kind(&err), Some("Spawn"));
        let err = run_output("true", &opts).await.unwrap_err();
        assert_eq!(err_kind(&err), Some("Spawn"));
    }

    #[tokio::test]
    async fn test_run_or_die_with_exception() {
        assert!(run_or_die("true", &RunOptions::new()).await.is_ok());
        let err = run_or_die("exit 4", &RunOptions::new().exception(true))
            .await
            .unwrap_err();
        assert_eq!(err_kind(&err), Some("ExternalCommand"));
    }

    #[test]
    fn test_from_config() {
        let config = ExecConfig {
            shell: "bash".into(),
            default_timeout_secs: Some(7),
            show_commands: true,
        };
        let opts = RunOptions::from_config(&config);
        assert_eq!(opts.shell.as_deref(), Some("bash"));
        assert_eq!(opts.timeout, Some(Duration::from_secs(7)));
        assert!(opts.show);
        assert!(opts.strip);
        assert!(!opts.exception);
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote(""), "''");
    }
}
