// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named mutex configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides the directory holding the lock files
pub const LOCK_DIR_ENV: &str = "HF_LOCK_DIR";

/// Shortest pause between attempts on a contended mutex
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Where named mutexes live and how often a contended one is retried.
///
/// Every process that should contend on the same names must agree on
/// `namespace_dir`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutexConfig {
    /// Directory holding one lock file per mutex name
    pub namespace_dir: PathBuf,
    /// Pause between attempts on a contended mutex
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for MutexConfig {
    fn default() -> Self {
        Self {
            namespace_dir: default_namespace_dir(),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl MutexConfig {
    pub fn with_namespace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.namespace_dir = dir.into();
        self
    }

    /// Set the retry pause, raised to [`MIN_POLL_INTERVAL`] if shorter.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        if config.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }
}

/// `$HF_LOCK_DIR`, or `hf-locks` under the system temp directory
pub fn default_namespace_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(LOCK_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::temp_dir().join("hf-locks")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: poll_interval must be greater than zero")]
    ZeroPollInterval,
}
