//! # bghelper
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Helpers for scripting around external programs: run shell commands with
//! timeouts and error escalation, grep and split their output, drive `git`,
//! `docker`, `ssh`, `pip` and `ps`, and run work in the background with any
//! failure captured as a structured record.
//!
//! ## Architecture
//!
//! - **`core`**: Infrastructure shared by everything else: the `BgError` type,
//!   TOML configuration and `tracing` setup.
//! - **`common`**: The helpers themselves.
//!
//! The `bgh` binary in this package exposes the helpers as subcommands.
//!
pub mod common;
pub mod core;
