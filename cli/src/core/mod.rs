//! # bghelper Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by all helpers:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `logging`: `tracing` subscriber setup (console and optional log file)
//!
//! ```rust
//! use bghelper::core::config; // For loading configuration
//! use bghelper::core::error::{BgError, Result}; // For error handling
//! use bghelper::core::logging; // For log setup and the active log file
//! ```
//!
pub mod config;
pub mod error;
pub mod logging;
