//! Configuration types for the core services

use std::path::PathBuf;

use appkeep_pkg::WingetConfig;
use serde::{Deserialize, Serialize};

/// Directory name used under the home directory when none is configured
const DEFAULT_LOG_DIR: &str = "appkeep_logs";

/// Settings consumed by [`crate::Vault`] and the package manager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// winget program and timeouts
    #[serde(default)]
    pub winget: WingetConfig,
    /// Per-session install log
    #[serde(default)]
    pub session_log: SessionLogConfig,
}

/// Session log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLogConfig {
    /// Directory for `install_*.log` files (defaults to `~/appkeep_logs`)
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Write a log file for every install run
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for SessionLogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            enabled: default_enabled(),
        }
    }
}

impl SessionLogConfig {
    /// Disabled session log, mostly for tests
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            directory: None,
            enabled: false,
        }
    }

    /// Log into `directory`
    #[must_use]
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            enabled: true,
        }
    }

    /// Effective log directory, `None` when disabled or no home directory exists
    #[must_use]
    pub fn resolve_directory(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        self.directory
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(DEFAULT_LOG_DIR)))
    }
}
