//! # bghelper Docker Container Lifecycle
//!
//! File: cli/src/common/docker/lifecycle.rs
//!
//! ## Overview
//!
//! Starting, creating, stopping and removing containers through the docker CLI.
//!
//! - **`docker_stop`**: `docker stop` (or `docker kill --signal`), optionally
//!   followed by `docker rm`.
//! - **`docker_start_or_run`**: `docker start <name>`; when that fails (or `force`
//!   is set) a new container is created with `docker run` from a [`ContainerSpec`].
//! - **`docker_cleanup_volumes`**: Runs the `martin/docker-cleanup-volumes` image,
//!   useful when creating containers fails with "No space left on device".
//!
use super::{docker_failure, docker_succeeded, DockerOptions};
use crate::common::process::{quote, run, run_capture};
use crate::common::text::string_to_list;
use crate::core::error::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// How [`docker_stop`] stops a container.
#[derive(Debug, Clone)]
pub struct StopOptions {
    /// Use `docker kill` instead of `docker stop`.
    pub kill: bool,
    /// Signal sent by `docker kill`.
    pub signal: String,
    /// Remove the container afterwards.
    pub rm: bool,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            kill: false,
            signal: "KILL".to_string(),
            rm: false,
        }
    }
}

/// Everything needed to start or create a container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    /// `image:tag`. Required whenever a new container has to be created.
    pub image: String,
    /// Command to run in the container.
    pub command: String,
    /// Run in the background. Ignored (off) when `interactive` is set.
    pub detach: bool,
    /// Remove the container when it exits.
    pub rm: bool,
    /// Keep STDIN open and allocate a pseudo-TTY.
    pub interactive: bool,
    /// `host-port:container-port` mappings.
    pub ports: Vec<String>,
    /// `host-path:container-path` mappings.
    pub volumes: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    /// Stop and remove an existing container before re-creating it.
    pub force: bool,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: String::new(),
            command: String::new(),
            detach: true,
            rm: false,
            interactive: false,
            ports: Vec::new(),
            volumes: Vec::new(),
            env_vars: BTreeMap::new(),
            force: false,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn detach(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }

    pub fn rm(mut self, rm: bool) -> Self {
        self.rm = rm;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Adds port mappings from a string separated by any of `, ; |`.
    pub fn ports(mut self, ports: &str) -> Self {
        self.ports.extend(string_to_list(ports));
        self
    }

    /// Adds volume mappings from a string separated by any of `, ; |`.
    pub fn volumes(mut self, volumes: &str) -> Self {
        self.volumes.extend(string_to_list(volumes));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The `docker run` command that creates this container.
    pub fn run_command(&self) -> String {
        let mut parts = vec![format!("docker run --name {}", quote(&self.name))];
        if self.rm {
            parts.push("--rm".to_string());
        }
        if self.interactive {
            parts.push("--tty --interactive".to_string());
        } else if self.detach {
            parts.push("--detach".to_string());
        }
        for port in &self.ports {
            parts.push(format!("--publish {}", port));
        }
        for volume in &self.volumes {
            parts.push(format!("--volume {}", volume));
        }
        for (key, value) in &self.env_vars {
            parts.push(format!("--env {}={}", key, quote(value)));
        }
        parts.push(self.image.clone());
        if !self.command.is_empty() {
            parts.push(self.command.clone());
        }
        parts.join(" ")
    }
}

/// Stops (or kills) a container and optionally removes it.
/// Returns `true` when every docker command succeeded.
#[instrument(skip(stop, opts))]
pub async fn docker_stop(name: &str, stop: &StopOptions, opts: &DockerOptions) -> Result<bool> {
    let cmd = if stop.kill {
        format!("docker kill --signal {} {}", quote(&stop.signal), quote(name))
    } else {
        format!("docker stop {}", quote(name))
    };
    let captured = run_capture(&cmd, &opts.run_options()).await?;
    if opts.show {
        println!("{}", captured.output);
    }
    if !docker_succeeded(&captured) {
        return docker_failure(opts, captured.output);
    }

    if stop.rm {
        let cmd = format!("docker rm {}", quote(name));
        let captured = run_capture(&cmd, &opts.run_options()).await?;
        if opts.show {
            println!("{}", captured.output);
        }
        if !docker_succeeded(&captured) {
            return docker_failure(opts, captured.output);
        }
    }
    info!("Stopped container '{}'", name);
    Ok(true)
}

/// Starts the existing container `spec.name`, or creates it with `docker run`.
///
/// With `spec.force` the container is first stopped and removed, so an image
/// is required. Interactive runs attach to the terminal and succeed on exit
/// code 0.
#[instrument(skip(spec, opts), fields(container = %spec.name))]
pub async fn docker_start_or_run(spec: &ContainerSpec, opts: &DockerOptions) -> Result<bool> {
    if spec.force {
        if spec.image.is_empty() {
            return docker_failure(opts, "The \"image\" arg is required since force is set");
        }
        let replace = StopOptions {
            rm: true,
            ..StopOptions::default()
        };
        // The container may not exist yet; that is fine here.
        docker_stop(&spec.name, &replace, &opts.exception(false)).await?;
    } else {
        let cmd = format!("docker start {}", quote(&spec.name));
        let captured = run_capture(&cmd, &opts.run_options()).await?;
        if opts.show {
            println!("{}", captured.output);
        }
        if docker_succeeded(&captured) {
            return Ok(true);
        }
        debug!("Could not start '{}': {}", spec.name, captured.output);
        if spec.image.is_empty() {
            return docker_failure(
                opts,
                format!(
                    "Could not start \"{}\", so \"image\" arg is required",
                    spec.name
                ),
            );
        }
    }

    let cmd = spec.run_command();
    if spec.interactive {
        let code = run(&cmd, &opts.run_options()).await?;
        return Ok(code == 0);
    }

    let captured = run_capture(&cmd, &opts.run_options()).await?;
    if opts.show {
        println!("{}", captured.output);
    }
    if !docker_succeeded(&captured) {
        return docker_failure(opts, captured.output);
    }
    info!("Created container '{}' from {}", spec.name, spec.image);
    Ok(true)
}

/// Runs the `martin/docker-cleanup-volumes` image to reclaim space from orphaned volumes.
///
/// See <https://github.com/chadoe/docker-cleanup-volumes>.
pub async fn docker_cleanup_volumes(opts: &DockerOptions) -> Result<bool> {
    let spec = ContainerSpec::new("cleanup-volumes")
        .image("martin/docker-cleanup-volumes")
        .rm(true)
        .volumes("/var/run/docker.sock:/var/run/docker.sock:ro, /var/lib/docker:/var/lib/docker");
    docker_start_or_run(&spec, opts).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_detached() {
        let spec = ContainerSpec::new("redis-dev")
            .image("redis:7")
            .ports("6379:6379; 16379:16379")
            .env("DEBUG", "1");
        assert_eq!(
            spec.run_command(),
            "docker run --name redis-dev --detach --publish 6379:6379 --publish 16379:16379 --env DEBUG=1 redis:7"
        );
    }

    #[test]
    fn test_run_command_interactive_disables_detach() {
        let spec = ContainerSpec::new("scratch")
            .image("alpine")
            .command("sh")
            .interactive(true)
            .rm(true);
        assert_eq!(
            spec.run_command(),
            "docker run --name scratch --rm --tty --interactive alpine sh"
        );
    }

    #[test]
    fn test_run_command_quotes_env_values() {
        let spec = ContainerSpec::new("web")
            .image("nginx")
            .detach(false)
            .env("GREETING", "hello world");
        assert_eq!(
            spec.run_command(),
            "docker run --name web --env GREETING='hello world' nginx"
        );
    }

    #[test]
    fn test_cleanup_spec_volumes() {
        let spec = ContainerSpec::new("x")
            .volumes("/var/run/docker.sock:/var/run/docker.sock:ro, /var/lib/docker:/var/lib/docker");
        assert_eq!(
            spec.volumes,
            vec![
                "/var/run/docker.sock:/var/run/docker.sock:ro",
                "/var/lib/docker:/var/lib/docker"
            ]
        );
    }

    #[tokio::test]
    async fn test_force_without_image_fails_before_running_docker() {
        let spec = ContainerSpec::new("anything").force(true);
        assert!(!docker_start_or_run(&spec, &DockerOptions::default())
            .await
            .unwrap());
        let err = docker_start_or_run(&spec, &DockerOptions::default().exception(true))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn test_stop_defaults() {
        let stop = StopOptions::default();
        assert!(!stop.kill);
        assert_eq!(stop.signal, "KILL");
        assert!(!stop.rm);
    }

    #[tokio::test]
    #[ignore] // Requires a running Docker daemon and the alpine image
    async fn test_start_or_run_and_stop() {
        let opts = DockerOptions::default().exception(true);
        let spec = ContainerSpec::new("bghelper-test-alpine")
            .image("alpine:latest")
            .command("sleep 60")
            .force(true);
        assert!(docker_start_or_run(&spec, &opts).await.unwrap());
        let stop = StopOptions {
            rm: true,
            ..StopOptions::default()
        };
        assert!(docker_stop(&spec.name, &stop, &opts).await.unwrap());
    }
}
