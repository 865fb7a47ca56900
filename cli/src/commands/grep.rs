//! # bghelper Grep Command
//!
//! File: cli/src/commands/grep.rs
//!
//! `bgh grep` filters text read from stdin with `common::grep`.
//!
//! ```bash
//! docker ps | bgh grep redis
//! dmesg | bgh grep -B 2 -A 2 --pipe 'tail -n 20' usb
//! git status --porcelain | bgh grep --regex '\?\? (.*)'
//! ```
//!
use anyhow::{anyhow, Context};
use bghelper::common::grep::{grep_output, GrepOptions};
use bghelper::core::{
    config::Config,
    error::{BgError, Result},
};
use clap::Parser;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(about = "Select lines of stdin with grep or an anchored regex")]
pub struct GrepArgs {
    /// Pattern passed to `grep`.
    pattern: Option<String>,

    /// Match a regular expression at the start of each line instead of a pattern.
    #[arg(long, short = 'r', conflicts_with = "pattern")]
    regex: Option<String>,

    #[arg(long)]
    case_sensitive: bool,

    /// Select non-matching lines.
    #[arg(long)]
    invert: bool,

    #[arg(short = 'B', long = "before")]
    before: Option<usize>,

    #[arg(short = 'A', long = "after")]
    after: Option<usize>,

    /// Trim each result line.
    #[arg(long)]
    strip: bool,

    /// Pipe the grep result through this command.
    #[arg(long)]
    pipe: Option<String>,

    /// Separator placed between result lines.
    #[arg(long, default_value = "\n")]
    join: String,
}

impl GrepArgs {
    fn options(&self) -> GrepOptions {
        GrepOptions {
            pattern: self.pattern.clone(),
            regex: self.regex.clone(),
            lines_before_match: self.before,
            lines_after_match: self.after,
            extra_pipe: self.pipe.clone(),
            join_result_string_on: self.join.clone(),
            ..GrepOptions::default()
        }
        .ignore_case(!self.case_sensitive)
        .invert(self.invert)
        .strip_whitespace(self.strip)
    }
}

/// Exits 1 when nothing matched, like `grep`.
pub async fn handle_grep(args: GrepArgs, config: &Config) -> Result<i32> {
    if args.pattern.is_none() && args.regex.is_none() && args.pipe.is_none() {
        return Err(anyhow!(BgError::Argument(
            "Give a pattern, --regex or --pipe".to_string()
        )));
    }
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read stdin")?;

    let opts = args.options().show(config.exec.show_commands);
    let lines = grep_output(&input, &opts).await?;
    if lines.is_empty() {
        return Ok(1);
    }
    println!("{}", lines.join(&opts.join_result_string_on));
    Ok(0)
}
