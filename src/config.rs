// src/config.rs

//! Configuration file handling
//!
//! mason reads an optional TOML configuration file, either from the path
//! given on the command line or from the user's config directory
//! (`<config dir>/mason/mason.toml`). Every field has a default, and the
//! CLI flags override whatever the file says, so a missing file is never
//! an error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Orchestrator-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Robot search path for locating dependency recipes
    pub robot_path: Option<PathBuf>,

    /// Root under which packages install
    pub install_root: PathBuf,

    /// Root of the modulefiles tree the oracle consults
    pub module_root: PathBuf,

    /// Per-step timeout in seconds
    pub timeout_secs: u64,

    /// Parallel jobs within one build (0 = autodetect)
    pub jobs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robot_path: None,
            install_root: PathBuf::from("/opt/mason/software"),
            module_root: PathBuf::from("/opt/mason/modules"),
            timeout_secs: 3600,
            jobs: 0,
        }
    }
}

impl Config {
    /// Load configuration: explicit path, else the default location, else
    /// built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ParseError(format!("invalid config {}: {}", path.display(), e)))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// `<config dir>/mason/mason.toml`, if a config dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mason").join("mason.toml"))
    }

    /// The per-step timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective job count (autodetect when 0)
    pub fn effective_jobs(&self) -> u32 {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism()
                .map(|p| p.get() as u32)
                .unwrap_or(4)
        }
    }
}
