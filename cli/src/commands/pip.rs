//! # bghelper Pip Command Group
//!
//! File: cli/src/commands/pip.rs
//!
//! `bgh pip` runs pip for the active virtual environment (`VIRTUAL_ENV`).
//!
//! ```bash
//! bgh pip freeze
//! bgh pip install-editable ../lib-a,../lib-b
//! bgh pip extras requests
//! ```
//!
use super::run_options;
use bghelper::common::pip::{pip_extras, pip_freeze, pip_install_editable, PipEnv, PipOptions};
use bghelper::core::{config::Config, error::Result};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct PipArgs {
    /// Run even outside a virtual environment.
    #[arg(long, global = true)]
    any_env: bool,

    #[command(subcommand)]
    command: PipCommand,
}

#[derive(Subcommand, Debug)]
enum PipCommand {
    /// Print installed requirements.
    Freeze,
    /// `pip install -e` each path (`,`, `;` or `|` separated values allowed).
    InstallEditable {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },
    /// Print the extras a package declares.
    Extras { package: String },
}

pub async fn handle_pip(args: PipArgs, config: &Config) -> Result<i32> {
    let env = PipEnv::detect(&config.pip);
    let mut opts = PipOptions::from_config(&config.pip, run_options(config, None).exception(true));
    if args.any_env {
        opts.venv_only = false;
    }

    match args.command {
        PipCommand::Freeze => {
            for line in pip_freeze(&env, &opts).await?.unwrap_or_default() {
                println!("{}", line);
            }
            Ok(0)
        }
        PipCommand::InstallEditable { paths } => {
            Ok(pip_install_editable(&env, &paths, &opts).await?.unwrap_or(1))
        }
        PipCommand::Extras { package } => match pip_extras(&env, &package, &opts).await? {
            Some(extras) => {
                for extra in extras {
                    println!("{}", extra);
                }
                Ok(0)
            }
            None => {
                eprintln!("Package '{}' is not installed", package);
                Ok(1)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_install_editable_args() {
        let args = PipArgs::try_parse_from([
            "pip",
            "install-editable",
            "../a,../b",
            "../c",
            "--any-env",
        ])
        .unwrap();
        assert!(args.any_env);
        match args.command {
            PipCommand::InstallEditable { paths } => assert_eq!(paths, vec!["../a,../b", "../c"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_install_editable_requires_paths() {
        assert!(PipArgs::try_parse_from(["pip", "install-editable"]).is_err());
    }
}
