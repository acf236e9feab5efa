//! Configuration management.

use crate::models::TierIntervals;
use crate::{Error, GitPollSettings, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for recue.
#[derive(Debug, Clone)]
pub struct RecueConfig {
    /// Path to the git repository to watch.
    pub repo_path: PathBuf,
    /// Directory holding guideline markdown files.
    pub guidelines_dir: PathBuf,
    /// Default repeat intervals per priority band.
    pub intervals: TierIntervals,
    /// Git snapshot cache timing.
    pub git: GitPollSettings,
}

impl Default for RecueConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            guidelines_dir: PathBuf::from(".recue"),
            intervals: TierIntervals::default(),
            git: GitPollSettings::default(),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Repository path.
    pub repo_path: Option<String>,
    /// Guidelines directory.
    pub guidelines_dir: Option<String>,
    /// Interval overrides per priority band.
    pub intervals: Option<ConfigFileIntervals>,
    /// Git cache timing.
    pub git: Option<ConfigFileGit>,
}

/// Intervals section in the config file, in tokens.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileIntervals {
    /// Interval for tiers 8-9.
    pub high: Option<u64>,
    /// Interval for tiers 5-7.
    pub normal: Option<u64>,
    /// Interval for tiers 1-4.
    pub low: Option<u64>,
}

/// Git section in the config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileGit {
    /// Snapshot TTL in seconds.
    pub ttl_secs: Option<u64>,
    /// Background refresh cadence in seconds.
    pub cadence_secs: Option<u64>,
    /// Forced-refresh timeout in seconds.
    pub refresh_timeout_secs: Option<u64>,
}

impl RecueConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/recue/` on macOS)
    /// 2. XDG config dir (`~/.config/recue/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("recue").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("recue")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `RecueConfig`, validating intervals.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(repo_path) = file.repo_path {
            config.repo_path = PathBuf::from(repo_path);
        }
        if let Some(guidelines_dir) = file.guidelines_dir {
            config.guidelines_dir = PathBuf::from(guidelines_dir);
        }
        if let Some(intervals) = file.intervals {
            if let Some(high) = intervals.high {
                config.intervals.high = high;
            }
            if let Some(normal) = intervals.normal {
                config.intervals.normal = normal;
            }
            if let Some(low) = intervals.low {
                config.intervals.low = low;
            }
            if config.intervals.high == 0 || config.intervals.normal == 0 || config.intervals.low == 0
            {
                return Err(Error::InvalidArgument(
                    "repeat intervals must be greater than zero".to_string(),
                ));
            }
        }
        if let Some(git) = file.git {
            if let Some(ttl) = git.ttl_secs {
                config.git.ttl = Duration::from_secs(ttl);
            }
            if let Some(cadence) = git.cadence_secs {
                config.git.cadence = Duration::from_secs(cadence);
            }
            if let Some(timeout) = git.refresh_timeout_secs {
                config.git.refresh_timeout = Duration::from_secs(timeout);
            }
        }

        Ok(config)
    }

    /// Sets the repository path.
    #[must_use]
    pub fn with_repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = path.into();
        self
    }

    /// Sets the guidelines directory.
    #[must_use]
    pub fn with_guidelines_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.guidelines_dir = path.into();
        self
    }

    /// Sets the per-band repeat intervals.
    #[must_use]
    pub const fn with_intervals(mut self, intervals: TierIntervals) -> Self {
        self.intervals = intervals;
        self
    }
}
