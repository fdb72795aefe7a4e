//! User configuration.
//!
//! Loaded from TOML, looked up in this order:
//!
//! 1. the path given with `--config`
//! 2. the `SCRUBSUM_CONFIG` environment variable
//! 3. `<config dir>/scrubsum/config.toml`
//!
//! A missing file means defaults; nothing is ever created implicitly.

pub mod parser;
pub mod validator;

use crate::utils::hash::DEFAULT_BUFFER_SIZE;
use crate::utils::thread_pool::DEFAULT_WORKERS;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "SCRUBSUM_CONFIG";

/// Smallest accepted hasher buffer.
pub const MIN_BUFFER_SIZE: usize = 4096;

/// Problems with the configuration file itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// Configuration file path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Configuration file path
        path: PathBuf,
        /// Parser diagnostic
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A value is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted key, e.g. `scan.workers`
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `[scan]` section
    #[serde(default)]
    pub scan: ScanConfig,

    /// `[output]` section
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings that shape how a scan runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Worker pool size for each phase
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Hasher read chunk size in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Whether to descend into symlinked directories
    #[serde(default = "default_follow_symlinks")]
    pub follow_symlinks: bool,
}

/// Console presentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report hashing milestones on stderr
    #[serde(default = "default_progress")]
    pub progress: bool,
    /// When to color the report
    #[serde(default)]
    pub color: ColorMode,
}

/// Color policy for console output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when writing to a terminal
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            follow_symlinks: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress: true,
            color: ColorMode::Auto,
        }
    }
}

impl Config {
    /// Where the configuration should be read from.
    ///
    /// `explicit` wins over the environment, which wins over the per-user
    /// config directory. `None` if no candidate could be determined.
    #[must_use]
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("scrubsum").join("config.toml"))
    }

    /// Load the configuration found by [`Config::locate`].
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::locate(explicit) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, falling back to defaults if it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML or mistyped values
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Override the worker count, e.g. from the command line
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `workers` is zero.
    pub fn set_workers(&mut self, workers: usize) -> Result<(), ConfigError> {
        self.scan.workers = workers;
        self.validate()
    }

    /// Check every value is within range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "scan.workers",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.scan.buffer_size < MIN_BUFFER_SIZE {
            return Err(ConfigError::Invalid {
                field: "scan.buffer_size",
                reason: format!(
                    "must be at least {MIN_BUFFER_SIZE} bytes, got {}",
                    self.scan.buffer_size
                ),
            });
        }

        Ok(())
    }
}

// Default functions for serde
const fn default_workers() -> usize {
    DEFAULT_WORKERS
}

const fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

const fn default_follow_symlinks() -> bool {
    true
}

const fn default_progress() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");

        let config = Config::load(&path)?;
        assert_eq!(config, Config::default());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = Path::new("/etc/scrubsum.toml");
        assert_eq!(
            Config::locate(Some(explicit)),
            Some(explicit.to_path_buf())
        );
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_workers(0),
            Err(ConfigError::Invalid {
                field: "scan.workers",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_small_buffer() {
        let mut config = Config::default();
        config.scan.buffer_size = 512;
        assert!(config.validate().is_err());

        config.scan.buffer_size = MIN_BUFFER_SIZE;
        assert!(config.validate().is_ok());
    }
}
