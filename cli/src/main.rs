//! # bgh Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `bgh` binary, a thin command-line front end over the
//! `bghelper` library. It handles:
//! - Command-line argument parsing using Clap
//! - Loading configuration (user file, project `.bghelper.toml`, or `--config`)
//! - Setting up logging based on verbosity flags and `[logging]`
//! - Routing execution to the handler in `commands::`
//!
//! ## Examples
//!
//! ```bash
//! bgh --help
//! bgh -vv run --timeout 30 -- make test
//! docker ps | bgh grep redis
//! ```
//!
//! Every handler returns the exit status `bgh` terminates with. Errors are
//! printed to stderr and exit with status 1.
//!
use bghelper::core::{config, logging};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "bgh",
    about = "Shell command helpers: run, grep, docker, git, ssh, pip, ps and background tasks",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of the user and project files.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    Run(commands::run::RunArgs),
    Output(commands::output::OutputArgs),
    Grep(commands::grep::GrepArgs),
    Capture(commands::capture::CaptureArgs),
    Bg(commands::bg::BgArgs),
    /// Docker container helpers.
    Docker(commands::docker::DockerArgs),
    /// Git repository helpers.
    Git(commands::git::GitArgs),
    Ssh(commands::ssh::SshArgs),
    /// Pip helpers for the active virtual environment.
    Pip(commands::pip::PipArgs),
    Ps(commands::ps::PsArgs),
}

/// Maps an exit code to a process status; signal deaths become `128 + signal`.
fn exit_status(code: i32) -> i32 {
    if code < 0 {
        128 - code
    } else {
        code
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init_logging(cli.verbose, &config.logging) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Run(args) => commands::run::handle_run(args, &config).await,
        Commands::Output(args) => commands::output::handle_output(args, &config).await,
        Commands::Grep(args) => commands::grep::handle_grep(args, &config).await,
        Commands::Capture(args) => commands::capture::handle_capture(args, &config).await,
        Commands::Bg(args) => commands::bg::handle_bg(args, &config).await,
        Commands::Docker(args) => commands::docker::handle_docker(args, &config).await,
        Commands::Git(args) => commands::git::handle_git(args, &config).await,
        Commands::Ssh(args) => commands::ssh::handle_ssh(args, &config).await,
        Commands::Pip(args) => commands::pip::handle_pip(args, &config).await,
        Commands::Ps(args) => commands::ps::handle_ps(args, &config).await,
    };

    match command_result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(exit_status(code)),
        Err(e) => {
            error!("Command execution failed: {:?}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
