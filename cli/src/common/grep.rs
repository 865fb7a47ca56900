//! # bghelper Output Grepping (`common::grep`)
//!
//! File: cli/src/common/grep.rs
//!
//! ## Overview
//!
//! Filters a block of command output the way a shell user would with
//! `... | grep ...`. Two matching styles are supported:
//!
//! - **regex** (in-process, via the `regex` crate): the expression is anchored
//!   at the start of every line. Capture groups, when present, are returned
//!   instead of the whole line.
//! - **pattern** (shells out to `grep`): supports `-i`, `-v`, `-B`/`-A` context
//!   and an optional `extra_pipe` command appended after the grep. Patterns that
//!   look like an alternation group (`(a|b)`) are passed with `-E`.
//!
//! The regex style wins when both are set. `invert`, context lines and
//! `extra_pipe` only apply to the pattern style.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bghelper::common::grep::{grep_output, GrepOptions};
//!
//! # async fn example(ps_text: &str) -> bghelper::core::error::Result<()> {
//! let python = grep_output(ps_text, &GrepOptions::with_pattern("python")).await?;
//! let versions = grep_output(ps_text, &GrepOptions::with_regex(r"\s+(3\.\d+)")).await?;
//! # Ok(())
//! # }
//! ```
//!
use crate::common::process::{quote, run_capture, RunOptions};
use crate::common::text::{splitlines, splitlines_and_strip};
use crate::core::error::{BgError, Result};
use anyhow::anyhow;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Options for [`grep_output`] and friends.
#[derive(Debug, Clone)]
pub struct GrepOptions {
    /// `grep` pattern (extended syntax allowed).
    pub pattern: Option<String>,
    /// Regular expression matched in-process at the start of each line.
    pub regex: Option<String>,
    pub ignore_case: bool,
    /// Select non-matching lines (pattern style only).
    pub invert: bool,
    /// Context lines before a match (pattern style, ignored with `invert`).
    pub lines_before_match: Option<usize>,
    /// Context lines after a match (pattern style, ignored with `invert`).
    pub lines_after_match: Option<usize>,
    /// Trim each result line.
    pub strip_whitespace: bool,
    /// Command(s) the grepped output is piped into (pattern style only).
    pub extra_pipe: Option<String>,
    /// Separator used by [`grep_output_string`].
    pub join_result_string_on: String,
    /// Echo the generated `grep` command before running it.
    pub show: bool,
}

impl Default for GrepOptions {
    fn default() -> Self {
        Self {
            pattern: None,
            regex: None,
            ignore_case: true,
            invert: false,
            lines_before_match: None,
            lines_after_match: None,
            strip_whitespace: false,
            extra_pipe: None,
            join_result_string_on: "\n".to_string(),
            show: false,
        }
    }
}

impl GrepOptions {
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn with_regex(regex: impl Into<String>) -> Self {
        Self {
            regex: Some(regex.into()),
            ..Self::default()
        }
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn lines_before(mut self, n: usize) -> Self {
        self.lines_before_match = Some(n);
        self
    }

    pub fn lines_after(mut self, n: usize) -> Self {
        self.lines_after_match = Some(n);
        self
    }

    pub fn strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_whitespace = strip;
        self
    }

    pub fn extra_pipe(mut self, pipe: impl Into<String>) -> Self {
        self.extra_pipe = Some(pipe.into());
        self
    }

    pub fn join_on(mut self, separator: impl Into<String>) -> Self {
        self.join_result_string_on = separator.into();
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }
}

/// Returns the lines of `output` selected by `opts`.
///
/// In regex style a line with one capture group yields that group, and a line
/// with several groups yields them joined by a tab (see [`grep_captures`] for
/// the individual groups).
pub async fn grep_output(output: &str, opts: &GrepOptions) -> Result<Vec<String>> {
    if let Some(regex) = opts.regex.as_deref() {
        let rx = compile(regex, opts.ignore_case)?;
        let results = matching_lines(output, &rx)
            .into_iter()
            .map(|(line, groups)| match groups.len() {
                0 => line.to_string(),
                1 => groups.into_iter().next().unwrap_or_default(),
                _ => groups.join("\t"),
            })
            .map(|hit| {
                if opts.strip_whitespace {
                    hit.trim().to_string()
                } else {
                    hit
                }
            })
            .collect();
        return Ok(results);
    }

    let filtered = filter_through_shell(output, opts).await?;
    Ok(if opts.strip_whitespace {
        splitlines_and_strip(&filtered)
    } else {
        splitlines(&filtered)
    })
}

/// [`grep_output`] joined by `opts.join_result_string_on`.
pub async fn grep_output_string(output: &str, opts: &GrepOptions) -> Result<String> {
    Ok(grep_output(output, opts)
        .await?
        .join(&opts.join_result_string_on))
}

/// Capture groups of every line matching `regex` (anchored at line start).
/// Lines matched by a regex without groups are returned as a single element.
pub fn grep_captures(output: &str, regex: &str, ignore_case: bool) -> Result<Vec<Vec<String>>> {
    let rx = compile(regex, ignore_case)?;
    Ok(matching_lines(output, &rx)
        .into_iter()
        .map(|(line, groups)| {
            if groups.is_empty() {
                vec![line.to_string()]
            } else {
                groups
            }
        })
        .collect())
}

/// The shell pipeline used for the pattern style, or `None` when there is
/// nothing to run.
pub fn grep_command(opts: &GrepOptions) -> Option<String> {
    let pipe = opts
        .extra_pipe
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let Some(pattern) = opts.pattern.as_deref().filter(|p| !p.is_empty()) else {
        return pipe.map(str::to_string);
    };

    let mut parts = vec!["grep".to_string()];
    if !opts.invert {
        if let Some(n) = opts.lines_before_match.filter(|n| *n > 0) {
            parts.push(format!("-B {}", n));
        }
        if let Some(n) = opts.lines_after_match.filter(|n| *n > 0) {
            parts.push(format!("-A {}", n));
        }
    }
    let mut flags = String::new();
    if opts.ignore_case {
        flags.push('i');
    }
    if opts.invert {
        flags.push('v');
    }
    if !flags.is_empty() {
        parts.push(format!("-{}", flags));
    }
    if pattern.contains('(') && pattern.contains('|') && pattern.contains(')') {
        parts.push("-E".to_string());
    }
    parts.push("-e".to_string());
    parts.push(quote(pattern));

    let mut cmd = parts.join(" ");
    if let Some(pipe) = pipe {
        cmd.push_str(" | ");
        cmd.push_str(pipe);
    }
    Some(cmd)
}

fn compile(regex: &str, ignore_case: bool) -> Result<Regex> {
    RegexBuilder::new(&format!("^(?:{})", regex))
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| anyhow!(BgError::from(e)))
}

fn matching_lines<'a>(output: &'a str, rx: &Regex) -> Vec<(&'a str, Vec<String>)> {
    output
        .lines()
        .filter_map(|line| {
            let caps = rx.captures(line)?;
            let groups = caps
                .iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect();
            Some((line, groups))
        })
        .collect()
}

async fn filter_through_shell(output: &str, opts: &GrepOptions) -> Result<String> {
    let Some(cmd) = grep_command(opts) else {
        return Ok(output.to_string());
    };
    let run_opts = RunOptions::new().stdin(output).strip(false).show(opts.show);
    let captured = run_capture(&cmd, &run_opts).await?;
    match captured.code {
        0 => Ok(captured.output),
        // grep exits 1 when nothing matched.
        1 => {
            debug!("No lines matched: {}", cmd);
            Ok(captured.output)
        }
        status => Err(anyhow!(BgError::ExternalCommand {
            cmd,
            status,
            output: captured.output,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRUIT: &str = "apple\nbanana\nApricot\ncherry";

    #[tokio::test]
    async fn test_regex_is_anchored_and_case_insensitive_by_default() {
        let hits = grep_output(FRUIT, &GrepOptions::with_regex("a")).await.unwrap();
        assert_eq!(hits, vec!["apple", "Apricot"]);

        let hits = grep_output(FRUIT, &GrepOptions::with_regex("a").ignore_case(false))
            .await
            .unwrap();
        assert_eq!(hits, vec!["apple"]);
    }

    #[tokio::test]
    async fn test_regex_single_group() {
        let listing = "Available versions:\n  2.7.18\n  3.11.4\n  3.12.0\n";
        let hits = grep_output(listing, &GrepOptions::with_regex(r"  (3.*)"))
            .await
            .unwrap();
        assert_eq!(hits, vec!["3.11.4", "3.12.0"]);
    }

    #[tokio::test]
    async fn test_regex_multiple_groups() {
        let text = "HOME=/root\nnot a pair\nSHELL=/bin/sh";
        let hits = grep_output(text, &GrepOptions::with_regex(r"(\w+)=(.*)"))
            .await
            .unwrap();
        assert_eq!(hits, vec!["HOME\t/root", "SHELL\t/bin/sh"]);

        let groups = grep_captures(text, r"(\w+)=(.*)", true).unwrap();
        assert_eq!(
            groups,
            vec![vec!["HOME", "/root"], vec!["SHELL", "/bin/sh"]]
        );
    }

    #[tokio::test]
    async fn test_regex_strip_and_join() {
        let opts = GrepOptions::with_regex(r"\s*item.*")
            .strip_whitespace(true)
            .join_on(", ");
        let joined = grep_output_string("  item one \nother\n\titem two", &opts)
            .await
            .unwrap();
        assert_eq!(joined, "item one, item two");
    }

    #[test]
    fn test_invalid_regex() {
        let err = grep_captures(FRUIT, "(", true).unwrap_err();
        assert_eq!(err.downcast_ref::<BgError>().map(BgError::kind), Some("Regex"));
    }

    #[test]
    fn test_grep_command() {
        let opts = GrepOptions::with_pattern("error")
            .lines_before(2)
            .lines_after(1);
        assert_eq!(
            grep_command(&opts).unwrap(),
            "grep -B 2 -A 1 -i -e error"
        );

        let opts = GrepOptions::with_pattern("error")
            .invert(true)
            .lines_before(2)
            .ignore_case(false);
        assert_eq!(grep_command(&opts).unwrap(), "grep -v -e error");

        let opts = GrepOptions::with_pattern("(warn|error)").extra_pipe("wc -l");
        assert_eq!(
            grep_command(&opts).unwrap(),
            "grep -i -E -e '(warn|error)' | wc -l"
        );

        assert_eq!(
            grep_command(&GrepOptions::default().extra_pipe("sort")).unwrap(),
            "sort"
        );
        assert_eq!(grep_command(&GrepOptions::default()), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pattern_mode_uses_grep() {
        let text = "one\ntwo\nthree\nTWO again";
        let hits = grep_output(text, &GrepOptions::with_pattern("two"))
            .await
            .unwrap();
        assert_eq!(hits, vec!["two", "TWO again"]);

        let hits = grep_output(text, &GrepOptions::with_pattern("two").invert(true))
            .await
            .unwrap();
        assert_eq!(hits, vec!["one", "three"]);

        let opts = GrepOptions::with_pattern("one")
            .ignore_case(false)
            .lines_after(1);
        assert_eq!(grep_output(text, &opts).await.unwrap(), vec!["one", "two"]);

        let hits = grep_output(text, &GrepOptions::with_pattern("(one|three)"))
            .await
            .unwrap();
        assert_eq!(hits, vec!["one", "three"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pattern_mode_no_match_is_empty() {
        let hits = grep_output(FRUIT, &GrepOptions::with_pattern("zucchini"))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extra_pipe_only() {
        let opts = GrepOptions::default()
            .extra_pipe("wc -l")
            .strip_whitespace(true);
        assert_eq!(grep_output(FRUIT, &opts).await.unwrap(), vec!["4"]);
    }

    #[tokio::test]
    async fn test_no_pattern_no_pipe_returns_lines() {
        let hits = grep_output("a\n\nb\n", &GrepOptions::default()).await.unwrap();
        assert_eq!(hits, vec!["a", "b"]);
    }
}
