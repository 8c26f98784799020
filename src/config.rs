//! Configuration file handling
//!
//! Settings are layered: built-in defaults, then the TOML config file, then
//! command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Docker endpoint to try before auto-discovery
    pub docker_host: Option<String>,

    /// History lines requested per container when a stream opens
    pub tail_lines: u64,

    /// UI tick interval
    pub tick_rate_ms: u64,

    /// Where exported Markdown files are written
    pub export_dir: PathBuf,

    /// Tracing output while the TUI owns the terminal
    pub log_file: Option<PathBuf>,

    /// Also copy exports to the clipboard
    pub clipboard: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker_host: None,
            tail_lines: dockscope_docker::DEFAULT_TAIL_LINES,
            tick_rate_ms: 100,
            export_dir: std::env::temp_dir(),
            log_file: None,
            clipboard: true,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/dockscope/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dockscope").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `explicit`, or from the default location if it exists.
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command line flags on top of the file settings
    pub fn apply_overrides(
        &mut self,
        host: Option<String>,
        tail_lines: Option<u64>,
        log_file: Option<PathBuf>,
    ) {
        if host.is_some() {
            self.docker_host = host;
        }
        if let Some(tail) = tail_lines {
            self.tail_lines = tail;
        }
        if log_file.is_some() {
            self.log_file = log_file;
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}
