//! # bghelper Docker Container Interaction
//!
//! File: cli/src/common/docker/interaction.rs
//!
//! Opens an interactive shell in a container, starting it first if it is stopped.
//!
use super::{docker_start_or_run, ContainerSpec, DockerOptions};
use crate::common::process::{quote, run};
use crate::core::error::Result;
use std::collections::BTreeMap;
use tracing::info;

/// The `docker exec` command used by [`docker_shell`].
pub fn exec_command(name: &str, shell: &str, env_vars: &BTreeMap<String, String>) -> String {
    let mut parts = vec!["docker exec --tty --interactive".to_string()];
    for (key, value) in env_vars {
        parts.push(format!("--env {}={}", key, quote(value)));
    }
    parts.push(quote(name));
    parts.push(shell.to_string());
    parts.join(" ")
}

/// Starts `shell` inside container `name` and returns its exit code.
pub async fn docker_shell(
    name: &str,
    shell: &str,
    env_vars: &BTreeMap<String, String>,
    opts: &DockerOptions,
) -> Result<i32> {
    docker_start_or_run(&ContainerSpec::new(name), opts).await?;
    let cmd = exec_command(name, shell, env_vars);
    info!("Opening '{}' in container '{}'", shell, name);
    run(&cmd, &opts.run_options()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_command() {
        let mut env = BTreeMap::new();
        env.insert("TERM".to_string(), "xterm".to_string());
        env.insert("A".to_string(), "1".to_string());
        assert_eq!(
            exec_command("redis-dev", "bash", &env),
            "docker exec --tty --interactive --env A=1 --env TERM=xterm redis-dev bash"
        );
        assert_eq!(
            exec_command("redis-dev", "sh", &BTreeMap::new()),
            "docker exec --tty --interactive redis-dev sh"
        );
    }
}
