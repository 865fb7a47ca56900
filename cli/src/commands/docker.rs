//! # bghelper Docker Command Group
//!
//! File: cli/src/commands/docker.rs
//!
//! ## Overview
//!
//! `bgh docker` exposes the `common::docker` wrappers.
//!
//! ```bash
//! bgh docker ok
//! bgh docker start redis-dev --image redis:7 --port 6379:6379 -e DEBUG=1
//! bgh docker env redis-dev
//! bgh docker shell redis-dev --shell bash
//! bgh docker stop redis-dev --rm
//! ```
//!
//! Commands that report success exit 0 when docker succeeded and 1 otherwise.
//!
use super::parse_key_val;
use anyhow::Context;
use bghelper::common::docker::{self, ContainerSpec, DockerOptions, StopOptions};
use bghelper::core::{config::Config, error::Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;

#[derive(Parser, Debug)]
pub struct DockerArgs {
    /// Fail with an error instead of exit status 1 when docker reports one.
    #[arg(long, global = true)]
    exception: bool,

    #[command(subcommand)]
    command: DockerCommand,
}

#[derive(Subcommand, Debug)]
enum DockerCommand {
    /// Check that the docker daemon answers.
    Ok,
    /// Print the ID of a running container.
    Id { name: String },
    /// Print `docker container inspect` output as JSON.
    Inspect { name: String },
    /// Print a container's environment variables.
    Env { name: String },
    /// Start an existing container, or create it from an image.
    Start(StartArgs),
    /// Stop (or kill) a container.
    Stop {
        name: String,
        #[arg(long)]
        kill: bool,
        /// Signal used with --kill.
        #[arg(long, default_value = "KILL")]
        signal: String,
        /// Remove the container afterwards.
        #[arg(long)]
        rm: bool,
    },
    /// Open a shell in a container.
    Shell {
        name: String,
        #[arg(long, default_value = "sh")]
        shell: String,
        #[arg(short, long = "env", value_parser = parse_key_val)]
        env: Vec<(String, String)>,
    },
    /// Remove dangling volumes.
    CleanupVolumes,
}

#[derive(Parser, Debug)]
struct StartArgs {
    name: String,
    #[arg(long)]
    image: Option<String>,
    /// Command to run in the container.
    #[arg(long)]
    command: Option<String>,
    /// `host:container` port mappings (repeatable or `,`-separated).
    #[arg(short, long = "port")]
    ports: Vec<String>,
    /// `host:container` volume mappings (repeatable or `,`-separated).
    #[arg(long = "volume")]
    volumes: Vec<String>,
    #[arg(short, long = "env", value_parser = parse_key_val)]
    env: Vec<(String, String)>,
    #[arg(long)]
    rm: bool,
    #[arg(short, long)]
    interactive: bool,
    /// Stop and remove an existing container first.
    #[arg(long)]
    force: bool,
}

impl StartArgs {
    fn spec(&self) -> ContainerSpec {
        let mut spec = ContainerSpec::new(&self.name)
            .rm(self.rm)
            .interactive(self.interactive)
            .force(self.force)
            .ports(&self.ports.join(","))
            .volumes(&self.volumes.join(","));
        if let Some(image) = &self.image {
            spec = spec.image(image);
        }
        if let Some(command) = &self.command {
            spec = spec.command(command);
        }
        for (key, value) in &self.env {
            spec = spec.env(key, value);
        }
        spec
    }
}

fn status(ok: bool) -> i32 {
    if ok {
        0
    } else {
        1
    }
}

pub async fn handle_docker(args: DockerArgs, config: &Config) -> Result<i32> {
    let opts = DockerOptions::default()
        .exception(args.exception)
        .show(config.exec.show_commands);

    match args.command {
        DockerCommand::Ok => {
            let ok = docker::docker_ok(&opts).await?;
            println!("{}", if ok { "docker is available" } else { "docker is not available" });
            Ok(status(ok))
        }
        DockerCommand::Id { name } => match docker::docker_container_id(&name, &opts).await? {
            Some(id) => {
                println!("{}", id);
                Ok(0)
            }
            None => Ok(1),
        },
        DockerCommand::Inspect { name } => {
            match docker::docker_container_inspect(&name, &opts).await? {
                Some(entries) => {
                    let json = serde_json::to_string_pretty(&entries)
                        .context("Failed to serialize inspect output")?;
                    println!("{}", json);
                    Ok(0)
                }
                None => Ok(1),
            }
        }
        DockerCommand::Env { name } => {
            let vars = docker::docker_container_env_vars(&name, &opts).await?;
            for (key, value) in &vars {
                println!("{}={}", key, value);
            }
            Ok(0)
        }
        DockerCommand::Start(start) => {
            let ok = docker::docker_start_or_run(&start.spec(), &opts).await?;
            Ok(status(ok))
        }
        DockerCommand::Stop { name, kill, signal, rm } => {
            let stop = StopOptions { kill, signal, rm };
            Ok(status(docker::docker_stop(&name, &stop, &opts).await?))
        }
        DockerCommand::Shell { name, shell, env } => {
            let env_vars: BTreeMap<String, String> = env.into_iter().collect();
            docker::docker_shell(&name, &shell, &env_vars, &opts).await
        }
        DockerCommand::CleanupVolumes => Ok(status(docker::docker_cleanup_volumes(&opts).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_args_to_spec() {
        let args = DockerArgs::try_parse_from([
            "docker", "start", "redis-dev", "--image", "redis:7", "-p", "6379:6379",
            "-p", "16379:16379", "-e", "DEBUG=1",
        ])
        .unwrap();
        let DockerCommand::Start(start) = args.command else {
            panic!("expected start");
        };
        assert_eq!(
            start.spec().run_command(),
            "docker run --name redis-dev --detach --publish 6379:6379 --publish 16379:16379 --env DEBUG=1 redis:7"
        );
    }

    #[test]
    fn test_stop_defaults() {
        let args = DockerArgs::try_parse_from(["docker", "stop", "web"]).unwrap();
        match args.command {
            DockerCommand::Stop { name, kill, signal, rm } => {
                assert_eq!(name, "web");
                assert!(!kill);
                assert_eq!(signal, "KILL");
                assert!(!rm);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_exception_is_global() {
        let args = DockerArgs::try_parse_from(["docker", "env", "web", "--exception"]).unwrap();
        assert!(args.exception);
    }
}
