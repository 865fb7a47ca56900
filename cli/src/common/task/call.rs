//! # bghelper Error-Capture Call (`common::task::call`)
//!
//! File: cli/src/common/task/call.rs
//!
//! ## Overview
//!
//! [`Call`] invokes a function and converts any failure (a returned error or a
//! panic) into a [`CallResult`] carrying a [`CallFailure`] record: trace text,
//! error type and message, host name, and failure time. Records serialize to
//! JSON with the failure fields flattened next to `func_name`, `args`,
//! `status` and `value`.
//!
//! When a call fails:
//! 1. with `verbose`, a 70-character `=` separator is printed to stderr;
//! 2. the call description is logged with `error!`;
//! 3. with `verbose`, the trace is printed to stderr;
//! 4. the trace is appended to the log file (the configured logfile, or the
//!    one installed by `core::logging::init_logging`).
//!
use crate::core::error::{BgError, Result};
use crate::core::logging::{log_file_path, open_log_file};
use chrono::Local;
use futures_util::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

const SEPARATOR_WIDTH: usize = 70;
const TIME_FORMAT: &str = "%Y_%m%d-%a-%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Error,
}

/// Details of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallFailure {
    /// Full error chain (or panic message) as text.
    pub traceback_string: String,
    /// `BgError` variant name, `"panic"`, or `"anyhow::Error"` for other errors.
    pub error_type: String,
    pub error_value: String,
    pub fqdn: String,
    /// Seconds since the Unix epoch.
    pub time_epoch: f64,
    pub time_string: String,
}

/// Outcome of a [`Call`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult<T> {
    pub func_name: String,
    pub args: Vec<String>,
    pub status: CallStatus,
    pub value: Option<T>,
    #[serde(flatten)]
    pub failure: Option<CallFailure>,
}

impl<T> CallResult<T> {
    pub fn is_ok(&self) -> bool {
        self.status == CallStatus::Ok
    }
}

/// A named function invocation whose failures are captured rather than propagated.
#[derive(Debug, Clone)]
pub struct Call {
    func_name: String,
    args: Vec<String>,
    verbose: bool,
    logfile: Option<PathBuf>,
}

impl Call {
    pub fn new(func_name: impl Into<String>) -> Self {
        Self {
            func_name: func_name.into(),
            args: Vec::new(),
            verbose: true,
            logfile: None,
        }
    }

    /// Argument descriptions, used only for reporting.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Appends failure traces here instead of the logging file.
    pub fn logfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.logfile = Some(path.into());
        self
    }

    /// `func_name(arg, ...)`
    pub fn description(&self) -> String {
        format!("{}({})", self.func_name, self.args.join(", "))
    }

    /// Runs `f`, capturing an `Err` or a panic.
    pub fn run<T, F>(&self, f: F) -> CallResult<T>
    where
        F: FnOnce() -> Result<T>,
    {
        debug!("Calling {}", self.description());
        let outcome = catch_unwind(AssertUnwindSafe(f));
        self.finish(outcome)
    }

    /// Awaits `future`, capturing an `Err` or a panic.
    pub async fn run_async<T, F>(&self, future: F) -> CallResult<T>
    where
        F: Future<Output = Result<T>>,
    {
        debug!("Calling {}", self.description());
        let outcome = AssertUnwindSafe(future).catch_unwind().await;
        self.finish(outcome)
    }

    fn finish<T>(
        &self,
        outcome: std::result::Result<Result<T>, Box<dyn Any + Send>>,
    ) -> CallResult<T> {
        let failure = match outcome {
            Ok(Ok(value)) => {
                return CallResult {
                    func_name: self.func_name.clone(),
                    args: self.args.clone(),
                    status: CallStatus::Ok,
                    value: Some(value),
                    failure: None,
                }
            }
            Ok(Err(err)) => failure_from_error(&err),
            Err(payload) => failure_from_panic(payload.as_ref()),
        };
        self.report(&failure);
        CallResult {
            func_name: self.func_name.clone(),
            args: self.args.clone(),
            status: CallStatus::Error,
            value: None,
            failure: Some(failure),
        }
    }

    fn report(&self, failure: &CallFailure) {
        let separator = "=".repeat(SEPARATOR_WIDTH);
        if self.verbose {
            eprintln!("\n{}", separator);
        }
        error!(
            error_type = %failure.error_type,
            "Exception in {} on {} at {}: {}",
            self.description(),
            failure.fqdn,
            failure.time_string,
            failure.error_value
        );
        if self.verbose {
            eprintln!("{}", failure.traceback_string);
        }

        let Some(path) = self
            .logfile
            .clone()
            .or_else(|| log_file_path().map(PathBuf::from))
        else {
            return;
        };
        let entry = format!(
            "{}\n{} {} on {}\n{}\n",
            separator,
            failure.time_string,
            self.description(),
            failure.fqdn,
            failure.traceback_string
        );
        let written = open_log_file(&path).and_then(|mut file| {
            file.write_all(entry.as_bytes())?;
            Ok(())
        });
        if let Err(e) = written {
            warn!("Could not append trace to {}: {:#}", path.display(), e);
        }
    }
}

/// Shorthand for `Call::new(func_name).run(f)`.
pub fn call_func<T, F>(func_name: &str, f: F) -> CallResult<T>
where
    F: FnOnce() -> Result<T>,
{
    Call::new(func_name).run(f)
}

fn failure_from_error(err: &anyhow::Error) -> CallFailure {
    let error_type = err
        .downcast_ref::<BgError>()
        .map(BgError::kind)
        .unwrap_or("anyhow::Error");
    stamp(format!("{:?}", err), error_type, format!("{:#}", err))
}

fn failure_from_panic(payload: &(dyn Any + Send)) -> CallFailure {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    };
    stamp(format!("panicked: {}", message), "panic", message)
}

fn stamp(traceback_string: String, error_type: &str, error_value: String) -> CallFailure {
    let now = Local::now();
    CallFailure {
        traceback_string,
        error_type: error_type.to_string(),
        error_value,
        fqdn: fqdn().to_string(),
        time_epoch: now.timestamp_millis() as f64 / 1000.0,
        time_string: now.format(TIME_FORMAT).to_string(),
    }
}

/// Host name of this machine, resolved once.
pub fn fqdn() -> &'static str {
    static FQDN: OnceLock<String> = OnceLock::new();
    FQDN.get_or_init(|| match hostname::get() {
        Ok(name) if !name.is_empty() => name.to_string_lossy().into_owned(),
        Ok(_) => "localhost".to_string(),
        Err(e) => {
            debug!("Could not resolve host name: {}", e);
            "localhost".to_string()
        }
    })
}
