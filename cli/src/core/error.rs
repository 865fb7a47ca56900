//! # bghelper Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types shared by every helper in the crate.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `BgError`: A custom error enum using `thiserror` for the failure modes the
//!   helpers can report (failed or timed-out commands, docker errors, bad
//!   configuration, etc.)
//! - `Result<T>`: A type alias for `anyhow::Result<T>` so callers can attach
//!   context with `anyhow::Context`
//!
//! ## Examples
//!
//! ```rust,no_run
//! use bghelper::common::process::{self, RunOptions};
//! use bghelper::core::error::BgError;
//!
//! # async fn example() -> bghelper::core::error::Result<()> {
//! let opts = RunOptions::new().exception(true);
//! match process::run_output("false", &opts).await {
//!     Ok(output) => println!("{}", output),
//!     Err(e) if matches!(e.downcast_ref::<BgError>(), Some(BgError::ExternalCommand { .. })) => {
//!         println!("command exited non-zero");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
use std::time::Duration;
use thiserror::Error;

/// Custom error type for bghelper.
#[derive(Error, Debug)]
pub enum BgError {
    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: i32,
        output: String,
    },

    #[error("Command timed out after {:.1}s: {cmd}", timeout.as_secs_f64())]
    Timeout { cmd: String, timeout: Duration },

    #[error("Failed to spawn command '{cmd}': {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Not in a virtual environment")]
    NotInVenv,

    #[error("Invalid regular expression: {source}")]
    Regex {
        #[from]
        source: regex::Error,
    },

    #[error("Could not parse output of '{cmd}': {reason}")]
    Parse { cmd: String, reason: String },

    #[error("Background task '{0}' could not be joined")]
    Task(String),

    #[error("Argument error: {0}")]
    Argument(String),
}

impl BgError {
    /// Short, stable name of the variant. Used as `error_type` in captured call records.
    pub fn kind(&self) -> &'static str {
        match self {
            BgError::ExternalCommand { .. } => "ExternalCommand",
            BgError::Timeout { .. } => "Timeout",
            BgError::Spawn { .. } => "Spawn",
            BgError::Config(_) => "Config",
            BgError::Docker(_) => "Docker",
            BgError::NotInVenv => "NotInVenv",
            BgError::Regex { .. } => "Regex",
            BgError::Parse { .. } => "Parse",
            BgError::Task(_) => "Task",
            BgError::Argument(_) => "Argument",
        }
    }
}

/// Type alias for Result using anyhow::Error.
pub type Result<T> = anyhow::Result<T>;
