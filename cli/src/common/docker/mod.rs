//! # bghelper Docker Module Interface (`common::docker`)
//!
//! File: cli/src/common/docker/mod.rs
//!
//! ## Overview
//!
//! Wrappers around the `docker` command-line client. Every helper assembles a
//! `docker ...` command string, runs it with the `common::process` primitives
//! and interprets the text that comes back.
//!
//! ## Architecture
//!
//! - **`state`**: Read-only queries (`docker_ok`, container ID lookup, inspect,
//!   config and environment variables).
//! - **`lifecycle`**: Starting, running, stopping and removing containers.
//! - **`interaction`**: Opening a shell inside a running container.
//!
//! A docker failure is detected from a non-zero exit code or from the
//! `Error response from daemon:` marker in the output. With
//! `DockerOptions::exception` set such failures become `BgError::Docker`;
//! otherwise the helpers return `false` / empty values.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bghelper::common::docker::{self, ContainerSpec, DockerOptions};
//!
//! # async fn example() -> bghelper::core::error::Result<()> {
//! let opts = DockerOptions::default();
//! if docker::docker_ok(&opts).await? {
//!     let spec = ContainerSpec::new("redis-dev")
//!         .image("redis:7")
//!         .ports("6379:6379");
//!     docker::docker_start_or_run(&spec, &opts).await?;
//!     let env = docker::docker_container_env_vars("redis-dev", &opts).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
use crate::common::process::{CommandOutput, RunOptions};
use crate::core::error::{BgError, Result};
use anyhow::anyhow;
use std::time::Duration;
use tracing::warn;

/// Opens a shell inside a running container.
pub mod interaction;
/// Controls the lifecycle of containers (start/run, stop, remove).
pub mod lifecycle;
/// Queries docker availability and container state.
pub mod state;

pub use interaction::docker_shell;
pub use lifecycle::{
    docker_cleanup_volumes, docker_start_or_run, docker_stop, ContainerSpec, StopOptions,
};
pub use state::{
    docker_container_config, docker_container_env_vars, docker_container_id,
    docker_container_inspect, docker_ok,
};

/// Marker the docker client prints when the daemon rejects a request.
pub const DOCKER_ERROR_MARKER: &str = "Error response from daemon:";

/// Options shared by the docker helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerOptions {
    /// Return `BgError::Docker` instead of `false` when docker reports an error.
    pub exception: bool,
    /// Echo each docker command and print its output.
    pub show: bool,
    /// Kill docker commands that run longer than this.
    pub timeout: Option<Duration>,
}

impl DockerOptions {
    pub fn exception(mut self, exception: bool) -> Self {
        self.exception = exception;
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub(crate) fn run_options(&self) -> RunOptions {
        RunOptions::new().show(self.show).maybe_timeout(self.timeout)
    }
}

/// Whether a captured docker command succeeded.
pub(crate) fn docker_succeeded(captured: &CommandOutput) -> bool {
    captured.success() && !captured.output.contains(DOCKER_ERROR_MARKER)
}

/// Reports a docker failure according to `opts`: an error with `exception`,
/// otherwise `Ok(false)` (printing `message` when `show` is set).
pub(crate) fn docker_failure(opts: &DockerOptions, message: impl Into<String>) -> Result<bool> {
    let message = message.into();
    if opts.exception {
        return Err(anyhow!(BgError::Docker(message)));
    }
    warn!("{}", message);
    if opts.show {
        println!("{}", message);
    }
    Ok(false)
}
