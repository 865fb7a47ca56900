//! # bghelper Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! The helpers proper. Every module here builds a command line, runs it through
//! `process` and turns the text that comes back into something typed.
//!
//! ## Architecture
//!
//! - **`process`**: The execution primitives (`run`, `run_output`,
//!   `run_or_die`) with timeout and error escalation. Everything else builds on these.
//! - **`text`**: Splitting of list arguments and command output.
//! - **`grep`**: Selecting lines of output, in-process (regex) or via `grep`.
//! - **`docker`**, **`git`**, **`ssh`**, **`pip`**, **`ps`**: Wrappers for the
//!   corresponding command-line tools.
//! - **`task`**: The error-capture call and the background task runner.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bghelper::common::{grep, process};
//!
//! # async fn example() -> bghelper::core::error::Result<()> {
//! let opts = process::RunOptions::new();
//! let df = process::run_output("df -h", &opts).await?;
//! let full = grep::grep_output(&df, &grep::GrepOptions::with_pattern("100%")).await?;
//! # Ok(())
//! # }
//! ```
//!
pub mod docker;
pub mod git;
pub mod grep;
pub mod pip;
pub mod process;
pub mod ps;
pub mod ssh;
pub mod task;
pub mod text;
