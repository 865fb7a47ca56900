//! # bghelper Git Command Group
//!
//! File: cli/src/commands/git.rs
//!
//! `bgh git` exposes the `common::git` wrappers for one repository.
//!
//! ```bash
//! bgh git branch
//! bgh git status --path ~/src/project
//! bgh git update --path ~/src/project
//! bgh git clone https://github.com/rust-lang/log.git /tmp/log
//! ```
//!
use super::run_options;
use bghelper::common::git;
use bghelper::core::{config::Config, error::Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct GitArgs {
    /// Repository to operate on.
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: GitCommand,
}

#[derive(Subcommand, Debug)]
enum GitCommand {
    /// Print the current branch.
    Branch,
    /// Print the `origin` remote URL.
    Url,
    /// List tags.
    Tags,
    /// Print `git status --porcelain` entries.
    Status,
    /// Fetch all remotes and rebase the current branch.
    Update,
    /// Clone a repository.
    Clone { url: String, dest: Option<PathBuf> },
}

pub async fn handle_git(args: GitArgs, config: &Config) -> Result<i32> {
    let path = args.path.as_path();
    match args.command {
        GitCommand::Branch => println!("{}", git::git_current_branch(path).await?),
        GitCommand::Url => println!("{}", git::git_origin_url(path).await?),
        GitCommand::Tags => {
            for tag in git::git_tags(path).await? {
                println!("{}", tag);
            }
        }
        GitCommand::Status => {
            for entry in git::git_status(path).await? {
                println!("{} {}", entry.code, entry.path);
            }
        }
        GitCommand::Update => {
            let ok = git::git_repo_update(path, &run_options(config, None)).await?;
            return Ok(if ok { 0 } else { 1 });
        }
        GitCommand::Clone { url, dest } => {
            let ok = git::git_clone(&url, dest.as_deref(), &run_options(config, None)).await?;
            return Ok(if ok { 0 } else { 1 });
        }
    }
    Ok(0)
}
