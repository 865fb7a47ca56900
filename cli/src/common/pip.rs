//! # bghelper Pip Helpers (`common::pip`)
//!
//! File: cli/src/common/pip.rs
//!
//! ## Overview
//!
//! Runs `pip` for the active Python virtual environment.
//!
//! [`PipEnv::detect`] finds the environment from `VIRTUAL_ENV` and locates
//! `pip` at `<venv>/bin/pip` (or `<venv>/Scripts/pip` on Windows), unless
//! `pip.pip_path` is configured. By default the helpers refuse to run outside
//! a virtual environment: with `exception` set that is `BgError::NotInVenv`,
//! otherwise the helpers return `None`.
//!
use crate::common::process::{quote, run, run_capture, run_output, RunOptions};
use crate::common::text::{get_list_from_arg_strings, splitlines};
use crate::core::config::PipConfig;
use crate::core::error::{BgError, Result};
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exit code used by the metadata script when the package is not installed.
const PACKAGE_NOT_FOUND: i32 = 3;

const EXTRAS_SCRIPT: &str = r#"import sys
try:
    from importlib.metadata import metadata, PackageNotFoundError
except ImportError:
    from importlib_metadata import metadata, PackageNotFoundError
try:
    extras = metadata(sys.argv[1]).get_all('Provides-Extra') or []
except PackageNotFoundError:
    sys.exit(3)
print('\n'.join(extras))
"#;

/// The Python environment pip commands run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipEnv {
    /// Root of the active virtual environment.
    pub venv: Option<PathBuf>,
    /// `pip` executable, if one was found.
    pub pip_path: Option<PathBuf>,
}

impl PipEnv {
    /// Detects the environment from `VIRTUAL_ENV` and the `[pip]` config section.
    pub fn detect(config: &PipConfig) -> Self {
        let venv = std::env::var_os("VIRTUAL_ENV")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::from_parts(venv, config)
    }

    pub fn from_parts(venv: Option<PathBuf>, config: &PipConfig) -> Self {
        let pip_path = config
            .pip_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| venv.as_deref().and_then(|v| venv_binary(v, "pip")));
        Self { venv, pip_path }
    }

    pub fn in_venv(&self) -> bool {
        self.venv.is_some()
    }

    /// The interpreter paired with this pip.
    pub fn python_path(&self) -> Option<PathBuf> {
        if let Some(python) = self.venv.as_deref().and_then(|v| venv_binary(v, "python")) {
            return Some(python);
        }
        let dir = self.pip_path.as_deref()?.parent()?;
        ["python", "python3", "python.exe"]
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

fn venv_binary(venv: &Path, name: &str) -> Option<PathBuf> {
    ["bin", "Scripts"]
        .iter()
        .flat_map(|dir| [venv.join(dir).join(name), venv.join(dir).join(format!("{}.exe", name))])
        .find(|candidate| candidate.is_file())
}

/// Options for the pip helpers.
#[derive(Debug, Clone)]
pub struct PipOptions {
    /// Only run inside a virtual environment.
    pub venv_only: bool,
    /// Execution options. `exception` defaults to `true` here.
    pub run: RunOptions,
}

impl Default for PipOptions {
    fn default() -> Self {
        Self {
            venv_only: true,
            run: RunOptions::new().exception(true),
        }
    }
}

impl PipOptions {
    pub fn from_config(config: &PipConfig, run: RunOptions) -> Self {
        Self {
            venv_only: config.venv_only,
            run,
        }
    }
}

/// Checks the venv requirement and returns the pip executable to use.
fn pip_for(env: &PipEnv, opts: &PipOptions) -> Result<Option<PathBuf>> {
    if opts.venv_only && !env.in_venv() {
        if opts.run.exception {
            return Err(anyhow!(BgError::NotInVenv));
        }
        warn!("Not in a venv");
        return Ok(None);
    }
    match &env.pip_path {
        Some(pip) => Ok(Some(pip.clone())),
        None if opts.run.exception => Err(anyhow!(BgError::Config(
            "Could not find a pip executable".to_string()
        ))),
        None => {
            warn!("Could not find a pip executable");
            Ok(None)
        }
    }
}

/// pip and python warnings on stderr stay out of parsed output.
fn stdout_only(opts: &PipOptions) -> RunOptions {
    opts.run.clone().discard_stderr(true)
}

/// Installed requirements as reported by `pip freeze`.
pub async fn pip_freeze(env: &PipEnv, opts: &PipOptions) -> Result<Option<Vec<String>>> {
    let Some(pip) = pip_for(env, opts)? else {
        return Ok(None);
    };
    let cmd = format!("{} freeze", quote(&pip.to_string_lossy()));
    let output = run_output(&cmd, &stdout_only(opts)).await?;
    Ok(Some(splitlines(&output)))
}

/// `pip install -e` for every path. `paths` may also hold strings separated by
/// any of `, ; |`. Returns pip's exit code.
pub async fn pip_install_editable<S: AsRef<str>>(
    env: &PipEnv,
    paths: &[S],
    opts: &PipOptions,
) -> Result<Option<i32>> {
    let paths = get_list_from_arg_strings(paths);
    if paths.is_empty() {
        return Err(anyhow!(BgError::Argument(
            "At least one path is required".to_string()
        )));
    }
    let Some(pip) = pip_for(env, opts)? else {
        return Ok(None);
    };
    let cmd = format!(
        "{} install {}",
        quote(&pip.to_string_lossy()),
        editable_args(&paths)
    );
    let run_opts = opts.run.clone().stderr_to_stdout(opts.run.show);
    Ok(Some(run(&cmd, &run_opts).await?))
}

fn editable_args(paths: &[String]) -> String {
    paths
        .iter()
        .map(|path| format!("-e {}", quote(path)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `Provides-Extra` names of an installed package, or `None` if it is not installed.
pub async fn pip_extras(
    env: &PipEnv,
    package: &str,
    opts: &PipOptions,
) -> Result<Option<Vec<String>>> {
    if pip_for(env, opts)?.is_none() {
        return Ok(None);
    }
    let Some(python) = env.python_path() else {
        if opts.run.exception {
            return Err(anyhow!(BgError::Config(
                "Could not find the python interpreter for this environment".to_string()
            )));
        }
        return Ok(None);
    };

    let cmd = format!(
        "{} -c {} {}",
        quote(&python.to_string_lossy()),
        quote(EXTRAS_SCRIPT),
        quote(package)
    );
    let captured = run_capture(&cmd, &stdout_only(opts)).await?;
    match captured.code {
        0 => Ok(Some(splitlines(&captured.output))),
        PACKAGE_NOT_FOUND => {
            debug!("Package '{}' is not installed", package);
            Ok(None)
        }
        status if opts.run.exception => Err(anyhow!(BgError::ExternalCommand {
            cmd: format!("{} (extras of {})", python.display(), package),
            status,
            output: captured.output,
        })),
        _ => Ok(None),
    }
}
