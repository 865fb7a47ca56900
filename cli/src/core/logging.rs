//! # bghelper Logging Setup
//!
//! File: cli/src/core/logging.rs
//!
//! ## Overview
//!
//! Installs the global `tracing` subscriber used by the `bgh` binary (library
//! users may install their own instead):
//!
//! - a compact console layer on stderr, filtered by `RUST_LOG` or, when that is
//!   unset, by the `-v` count (0=warn, 1=info, 2=debug, 3+=trace);
//! - an optional append-mode file layer without ANSI colours, filtered by
//!   `logging.file_level`.
//!
//! The active log file is remembered so `task::call` can append captured
//! failure traces to the same file.
//!
use crate::core::config::LoggingConfig;
use crate::core::error::{BgError, Result};
use anyhow::{anyhow, Context};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

/// Maps the `-v` count to a console filter directive.
pub fn console_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8, config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level(verbosity)));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    let (file_layer, file_path) = match &config.logfile {
        Some(logfile) => {
            let path = PathBuf::from(logfile);
            let level = config.file_level.parse::<LevelFilter>().map_err(|_| {
                anyhow!(BgError::Config(format!(
                    "Invalid logging.file_level '{}'",
                    config.file_level
                )))
            })?;
            let file = open_log_file(&path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(level);
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(path) = file_path {
        let _ = LOG_FILE.set(path);
    }
    Ok(())
}

/// The log file installed by [`init_logging`], if any.
pub fn log_file_path() -> Option<&'static Path> {
    LOG_FILE.get().map(PathBuf::as_path)
}

/// Opens `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
