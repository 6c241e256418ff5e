//! Configuration loading and types

use std::path::{Path, PathBuf};

use appkeep_core::{CoreConfig, SessionLogConfig};
use appkeep_pkg::WingetConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the appkeep binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// winget program and timeouts
    #[serde(default)]
    pub winget: WingetConfig,
    /// Per-session install log
    #[serde(default)]
    pub session_log: SessionLogConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            winget: WingetConfig::default(),
            session_log: SessionLogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path, the default paths, or use defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var("APPKEEP_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        let paths = [
            Some(PathBuf::from("appkeep.toml")),
            dirs::config_dir().map(|p| p.join("appkeep").join("appkeep.toml")),
        ];

        for path in paths.into_iter().flatten() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }

    /// Settings handed to the core services
    #[must_use]
    pub fn core(&self) -> CoreConfig {
        CoreConfig {
            winget: self.winget.clone(),
            session_log: self.session_log.clone(),
        }
    }
}
