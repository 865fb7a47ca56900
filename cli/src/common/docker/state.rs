//! # bghelper Docker State Querying
//!
//! File: cli/src/common/docker/state.rs
//!
//! ## Overview
//!
//! Read-only docker queries:
//! - **`docker_ok`**: Is the client installed and the daemon reachable (`docker ps`)?
//! - **`docker_container_id`**: ID of a running container, looked up by name in `docker ps`.
//! - **`docker_container_inspect`**: The parsed JSON array from `docker container inspect`.
//! - **`docker_container_config`**: The `Config` object of that inspection.
//! - **`docker_container_env_vars`**: `Config.Env` as a map.
//!
use super::{docker_failure, docker_succeeded, DockerOptions, DOCKER_ERROR_MARKER};
use crate::common::process::{quote, run_capture};
use crate::common::text::splitlines;
use crate::core::error::{BgError, Result};
use anyhow::anyhow;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Returns `true` if docker is installed and the daemon answers `docker ps`.
///
/// # Errors
///
/// With `opts.exception` set, returns `BgError::Docker` carrying the client
/// output when docker is unavailable.
pub async fn docker_ok(opts: &DockerOptions) -> Result<bool> {
    let captured = run_capture("docker ps", &opts.run_options()).await?;
    if docker_succeeded(&captured) && captured.output.contains("CONTAINER ID") {
        return Ok(true);
    }
    debug!("docker ps did not list containers: {}", captured.output);
    if opts.exception {
        return Err(anyhow!(BgError::Docker(captured.output)));
    }
    Ok(false)
}

/// Returns the ID of the running container called `name`, if any.
///
/// # Errors
///
/// With `opts.exception` set, a failing `docker ps` is `BgError::Docker`.
pub async fn docker_container_id(name: &str, opts: &DockerOptions) -> Result<Option<String>> {
    let captured = run_capture("docker ps", &opts.run_options()).await?;
    if !docker_succeeded(&captured) {
        debug!("docker ps failed: {}", captured.output);
        docker_failure(opts, captured.output)?;
        return Ok(None);
    }
    Ok(container_id_from_ps(&captured.output, name))
}

/// Finds the row of `docker ps` output whose last column (NAMES) is `name`
/// and returns its first column (CONTAINER ID).
pub fn container_id_from_ps(ps_output: &str, name: &str) -> Option<String> {
    splitlines(ps_output)
        .iter()
        .skip(1)
        .find_map(|line| {
            let mut fields = line.split_whitespace();
            let id = fields.next()?;
            (fields.last()? == name).then(|| id.to_string())
        })
}

/// Returns the parsed `docker container inspect` array, or `None` when docker
/// reports that the container does not exist.
#[instrument(skip(opts))]
pub async fn docker_container_inspect(
    name: &str,
    opts: &DockerOptions,
) -> Result<Option<Vec<Value>>> {
    let cmd = format!("docker container inspect {}", quote(name));
    let captured = run_capture(&cmd, &opts.run_options()).await?;
    let output = captured.output.as_str();

    if captured.success() && !output.contains(DOCKER_ERROR_MARKER) {
        match serde_json::from_str::<Vec<Value>>(output) {
            Ok(entries) => return Ok(Some(entries)),
            Err(e) => {
                if opts.exception {
                    return Err(anyhow!(BgError::Parse {
                        cmd,
                        reason: e.to_string(),
                    }));
                }
                debug!("Could not parse inspect output for '{}': {}", name, e);
                return Ok(None);
            }
        }
    }
    docker_failure(opts, output)?;
    Ok(None)
}

/// Returns the `Config` object of the container (empty when unavailable).
pub async fn docker_container_config(
    name: &str,
    opts: &DockerOptions,
) -> Result<Map<String, Value>> {
    let entries = docker_container_inspect(name, opts).await?;
    Ok(entries
        .as_deref()
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("Config"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default())
}

/// Returns the container's environment variables (`Config.Env`).
pub async fn docker_container_env_vars(
    name: &str,
    opts: &DockerOptions,
) -> Result<BTreeMap<String, String>> {
    let config = docker_container_config(name, opts).await?;
    Ok(env_vars_from_config(&config))
}

/// Splits each `KEY=value` entry of `Config.Env` on its first `=`.
/// Entries without `=` map to an empty value.
pub fn env_vars_from_config(config: &Map<String, Value>) -> BTreeMap<String, String> {
    config
        .get("Env")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|item| match item.split_once('=') {
                    Some((key, value)) => (key.to_string(), value.to_string()),
                    None => (item.to_string(), String::new()),
                })
                .collect()
        })
        .unwrap_or_default()
}
