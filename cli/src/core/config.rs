//! # bghelper Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the optional configuration that tunes
//! the helpers: which shell runs commands, a default timeout, where captured
//! failures are logged, and where `pip` lives.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.bghelper.toml` in current directory or ancestors
//!    (the search stops at the first directory containing `.git`)
//! 2. User-specific `<config dir>/bghelper/config.toml`
//! 3. Default values defined in the code
//!
//! Paths are expanded (`~` to the home directory) after merging, then the
//! result is validated.
//!
//! ## Examples
//!
//! ```toml
//! [exec]
//! shell = "bash"
//! default_timeout_secs = 30
//!
//! [logging]
//! logfile = "~/.cache/bghelper/bghelper.log"
//! file_level = "debug"
//!
//! [pip]
//! venv_only = true
//! ```
//!
use crate::core::error::{BgError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pip: PipConfig,
}

/// Settings for the command-execution primitives.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    /// Shell used to interpret command strings (`<shell> -c <cmd>`).
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Timeout applied when a caller does not set one. 0 or absent disables it.
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,
    /// Echo each command before running it.
    #[serde(default)]
    pub show_commands: bool,
}

/// Log file settings.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Append-mode log file. Captured call failures are also written here.
    #[serde(default)]
    pub logfile: Option<String>,
    /// Minimum level written to the log file.
    #[serde(default = "default_file_level")]
    pub file_level: String,
}

/// Settings for the pip helpers.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PipConfig {
    /// Explicit path to `pip`. Detected from `VIRTUAL_ENV` when unset.
    #[serde(default)]
    pub pip_path: Option<String>,
    /// Refuse to run pip outside of a virtual environment.
    #[serde(default = "default_venv_only")]
    pub venv_only: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            default_timeout_secs: None,
            show_commands: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logfile: None,
            file_level: default_file_level(),
        }
    }
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            pip_path: None,
            venv_only: default_venv_only(),
        }
    }
}

impl ExecConfig {
    /// The configured default timeout, treating 0 as "no timeout".
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn default_shell() -> String {
    if cfg!(windows) {
        "cmd".to_string()
    } else {
        "sh".to_string()
    }
}
fn default_file_level() -> String {
    "debug".to_string()
}
fn default_venv_only() -> bool {
    true
}

const PROJECT_CONFIG_FILENAME: &str = ".bghelper.toml";

/// One configuration file as written. Fields absent from the file stay `None`,
/// so a layer only overrides what it actually sets.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    #[serde(default)]
    exec: ExecLayer,
    #[serde(default)]
    logging: LoggingLayer,
    #[serde(default)]
    pip: PipLayer,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct ExecLayer {
    shell: Option<String>,
    default_timeout_secs: Option<u64>,
    show_commands: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct LoggingLayer {
    logfile: Option<String>,
    file_level: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct PipLayer {
    pip_path: Option<String>,
    venv_only: Option<bool>,
}

impl ConfigLayer {
    /// Fields set in `self` win; the rest come from `base`.
    fn over(self, base: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            exec: ExecLayer {
                shell: self.exec.shell.or(base.exec.shell),
                default_timeout_secs: self
                    .exec
                    .default_timeout_secs
                    .or(base.exec.default_timeout_secs),
                show_commands: self.exec.show_commands.or(base.exec.show_commands),
            },
            logging: LoggingLayer {
                logfile: self.logging.logfile.or(base.logging.logfile),
                file_level: self.logging.file_level.or(base.logging.file_level),
            },
            pip: PipLayer {
                pip_path: self.pip.pip_path.or(base.pip.pip_path),
                venv_only: self.pip.venv_only.or(base.pip.venv_only),
            },
        }
    }

    /// Fills every unset field with its default.
    fn resolve(self) -> Config {
        Config {
            exec: ExecConfig {
                shell: self.exec.shell.unwrap_or_else(default_shell),
                default_timeout_secs: self.exec.default_timeout_secs,
                show_commands: self.exec.show_commands.unwrap_or(false),
            },
            logging: LoggingConfig {
                logfile: self.logging.logfile,
                file_level: self.logging.file_level.unwrap_or_else(default_file_level),
            },
            pip: PipConfig {
                pip_path: self.pip.pip_path,
                venv_only: self.pip.venv_only.unwrap_or_else(default_venv_only),
            },
        }
    }
}

/// Loads the merged user + project configuration.
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config, project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

/// Loads a single configuration file, expanding and validating it.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let mut config = load_config_from_path(path)?.resolve();
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn load_user_config() -> Result<Option<ConfigLayer>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "bghelper", "bghelper") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<ConfigLayer>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file ({PROJECT_CONFIG_FILENAME}) found.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<ConfigLayer> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Option<ConfigLayer>, project: Option<ConfigLayer>) -> Config {
    let user = user.unwrap_or_default();
    match project {
        Some(project) => project.over(user).resolve(),
        None => user.resolve(),
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(logfile) = config.logging.logfile.as_mut() {
        *logfile = shellexpand::tilde(logfile.as_str()).into_owned();
        debug!("Expanded logfile path: {}", logfile);
    }
    if let Some(pip_path) = config.pip.pip_path.as_mut() {
        *pip_path = shellexpand::tilde(pip_path.as_str()).into_owned();
        debug!("Expanded pip path: {}", pip_path);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if config.exec.shell.trim().is_empty() {
        return Err(anyhow!(BgError::Config(
            "exec.shell cannot be empty".to_string()
        )));
    }
    if config.logging.file_level.parse::<tracing::Level>().is_err() {
        return Err(anyhow!(BgError::Config(format!(
            "Invalid logging.file_level '{}'. Expected one of trace, debug, info, warn, error.",
            config.logging.file_level
        ))));
    }
    if let Some(logfile) = &config.logging.logfile {
        let path = Path::new(logfile);
        if path.is_dir() {
            return Err(anyhow!(BgError::Config(format!(
                "Configured logfile '{}' is a directory.",
                path.display()
            ))));
        }
    }
    Ok(())
}
