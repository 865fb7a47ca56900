//! # bghelper Task Helpers (`common::task`)
//!
//! File: cli/src/common/task/mod.rs
//!
//! ## Overview
//!
//! Utilities for running work without letting its failures escape:
//!
//! - **`call`**: [`Call`] wraps a function (sync or async) so that a returned
//!   error or a panic becomes a structured [`CallResult`] record, logged and
//!   appended to the log file, instead of reaching the caller.
//! - **`background`**: [`SimpleBackgroundTask`] runs a callable or shell
//!   command on its own thread through a [`Call`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bghelper::common::task::{call_func, SimpleBackgroundTask};
//!
//! # fn example() -> bghelper::core::error::Result<()> {
//! let task = SimpleBackgroundTask::shell("sleep 1 && make docs")?;
//! let parsed = call_func("parse_port", || Ok("8080".parse::<u16>()?));
//! assert!(parsed.is_ok());
//! let finished = task.join()?;
//! println!("make docs exited with {:?}", finished.value);
//! # Ok(())
//! # }
//! ```
//!
pub mod background;
pub mod call;

pub use background::SimpleBackgroundTask;
pub use call::{call_func, Call, CallFailure, CallResult, CallStatus};
