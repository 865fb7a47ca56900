//! # bghelper Background Tasks (`common::task::background`)
//!
//! File: cli/src/common/task/background.rs
//!
//! Runs a callable or shell command on a dedicated, named thread. Work starts
//! as soon as the task is created and is wrapped in a [`Call`], so failures are
//! logged and recorded in the task's [`CallResult`] instead of propagating.
//! Dropping the task detaches the thread. Tasks cannot be cancelled and make no
//! ordering promises relative to each other.
//!
use crate::common::process::{run, RunOptions};
use crate::common::task::call::{Call, CallResult};
use crate::core::error::{BgError, Result};
use anyhow::{anyhow, Context};
use std::thread::{self, JoinHandle};
use tracing::info;

pub struct SimpleBackgroundTask<T> {
    name: String,
    handle: JoinHandle<CallResult<T>>,
}

impl<T: Send + 'static> SimpleBackgroundTask<T> {
    /// Starts `f` on a new thread.
    pub fn spawn<F>(name: impl Into<String>, f: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let name = name.into();
        Self::start(Call::new(name.clone()), name, f)
    }

    fn start<F>(call: Call, name: String, f: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("bg:{}", name))
            .spawn(move || call.run(f))
            .with_context(|| format!("Failed to start background task '{}'", name))?;
        info!("Started background task '{}'", name);
        Ok(Self { name, handle })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the task completes.
    pub fn join(self) -> Result<CallResult<T>> {
        self.handle
            .join()
            .map_err(|_| anyhow!(BgError::Task(self.name)))
    }
}

impl SimpleBackgroundTask<i32> {
    /// Runs `cmd` in the background with default options. The value is the exit code.
    pub fn shell(cmd: impl Into<String>) -> Result<Self> {
        Self::shell_with(cmd, RunOptions::new())
    }

    pub fn shell_with(cmd: impl Into<String>, opts: RunOptions) -> Result<Self> {
        let cmd = cmd.into();
        let call = Call::new("run").args([cmd.clone()]);
        let name = cmd.clone();
        Self::start(call, name, move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to build runtime for background command")?;
            runtime.block_on(run(&cmd, &opts))
        })
    }
}
