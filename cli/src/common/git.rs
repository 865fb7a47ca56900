//! # bghelper Git Helpers (`common::git`)
//!
//! File: cli/src/common/git.rs
//!
//! ## Overview
//!
//! Thin wrappers around the `git` command line. Each function targets a
//! repository path with `git -C <path>` so callers never change the process
//! working directory.
//!
//! - **`git_clone`** / **`git_repo_update`**: Return `true` on success.
//! - **`git_current_branch`**, **`git_origin_url`**, **`git_tags`**: Return text.
//! - **`git_status`**: Porcelain status lines as [`GitStatusEntry`] values.
//!
use crate::common::process::{quote, run, run_capture, run_output, RunOptions};
use crate::common::text::splitlines;
use crate::core::error::{BgError, Result};
use anyhow::anyhow;
use std::path::Path;
use tracing::{info, instrument, warn};

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStatusEntry {
    /// Two-character XY status code, e.g. ` M`, `??`, `R `.
    pub code: String,
    /// Path relative to the repository root (the new path for renames).
    pub path: String,
}

const CONFIG_KEY_MISSING: i32 = 1;

fn git(path: &Path, args: &str) -> String {
    format!("git -C {} {}", quote(&path.to_string_lossy()), args)
}

/// Clones `url` into `dest` (or git's default directory). Returns `true` on success.
pub async fn git_clone(url: &str, dest: Option<&Path>, opts: &RunOptions) -> Result<bool> {
    let mut cmd = format!("git clone {}", quote(url));
    if let Some(dest) = dest {
        cmd.push(' ');
        cmd.push_str(&quote(&dest.to_string_lossy()));
    }
    let code = run(&cmd, opts).await?;
    Ok(code == 0)
}

/// Fetches all remotes and rebases the current branch onto its upstream.
#[instrument(skip(opts))]
pub async fn git_repo_update(path: &Path, opts: &RunOptions) -> Result<bool> {
    for args in ["fetch --all --prune", "pull --rebase"] {
        let code = run(&git(path, args), opts).await?;
        if code != 0 {
            warn!("'git {}' failed in {} (exit {})", args, path.display(), code);
            return Ok(false);
        }
    }
    info!("Updated repository at {}", path.display());
    Ok(true)
}

/// Name of the checked-out branch (`HEAD` when detached).
pub async fn git_current_branch(path: &Path) -> Result<String> {
    run_output(
        &git(path, "rev-parse --abbrev-ref HEAD"),
        &RunOptions::new().exception(true),
    )
    .await
}

/// URL of the `origin` remote, or an empty string when it is not set.
///
/// # Errors
///
/// `BgError::ExternalCommand` when git fails for any other reason, e.g. `path`
/// is not a readable directory.
pub async fn git_origin_url(path: &Path) -> Result<String> {
    let cmd = git(path, "config --get remote.origin.url");
    let captured = run_capture(&cmd, &RunOptions::new()).await?;
    match captured.code {
        0 => Ok(captured.output.lines().next().unwrap_or_default().to_string()),
        // `git config --get` exits 1 when the key is not set.
        CONFIG_KEY_MISSING => Ok(String::new()),
        status => Err(anyhow!(BgError::ExternalCommand {
            cmd,
            status,
            output: captured.output,
        })),
    }
}

/// Tags of the repository, in git's default (lexical) order.
pub async fn git_tags(path: &Path) -> Result<Vec<String>> {
    let output = run_output(&git(path, "tag"), &RunOptions::new().exception(true)).await?;
    Ok(splitlines(&output))
}

/// Changed and untracked files.
pub async fn git_status(path: &Path) -> Result<Vec<GitStatusEntry>> {
    let output = run_output(
        &git(path, "status --porcelain"),
        &RunOptions::new().exception(true).strip(false),
    )
    .await?;
    Ok(parse_porcelain(&output))
}

/// Parses `git status --porcelain` (v1) output.
pub fn parse_porcelain(output: &str) -> Vec<GitStatusEntry> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let (code, rest) = line.split_at(2);
            let rest = rest.trim_start();
            let path = match rest.split_once(" -> ") {
                Some((_, renamed_to)) => renamed_to,
                None => rest,
            };
            GitStatusEntry {
                code: code.to_string(),
                path: path.trim_matches('"').to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_porcelain() {
        let output = " M src/lib.rs\n?? notes.txt\nR  old.rs -> new.rs\nA  \"with space.txt\"\n";
        let entries = parse_porcelain(output);
        assert_eq!(
            entries,
            vec![
                GitStatusEntry { code: " M".into(), path: "src/lib.rs".into() },
                GitStatusEntry { code: "??".into(), path: "notes.txt".into() },
                GitStatusEntry { code: "R ".into(), path: "new.rs".into() },
                GitStatusEntry { code: "A ".into(), path: "with space.txt".into() },
            ]
        );
        assert!(parse_porcelain("").is_empty());
    }

    #[test]
    fn test_git_command_quotes_path() {
        assert_eq!(
            git(Path::new("/tmp/my repo"), "tag"),
            "git -C '/tmp/my repo' tag"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_status_and_branch_in_fresh_repo() {
        let dir = tempfile::tempdir().unwrap();
        let setup = RunOptions::new().cwd(dir.path());
        if run("git init -q -b main", &setup).await.unwrap() != 0 {
            // git missing or too old for -b; nothing to check
            return;
        }
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let entries = git_status(dir.path()).await.unwrap();
        assert_eq!(
            entries,
            vec![GitStatusEntry { code: "??".into(), path: "a.txt".into() }]
        );
        assert_eq!(git_origin_url(dir.path()).await.unwrap(), "");
        assert!(git_tags(dir.path()).await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_origin_url_of_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = git_origin_url(&dir.path().join("does-not-exist"))
            .await
            .unwrap_err();
        match err.downcast_ref::<BgError>() {
            Some(BgError::ExternalCommand { status, output, .. }) => {
                assert_ne!(*status, CONFIG_KEY_MISSING);
                assert!(output.contains("does-not-exist"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
