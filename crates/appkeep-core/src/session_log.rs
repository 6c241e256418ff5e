//! Per-session install log on disk
//!
//! Independent of `tracing`: every line is written and flushed immediately
//! so a crash mid-install still leaves a complete record.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

/// Severity tag of a session log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Append-only session log; a no-op when no file could be opened
#[derive(Debug, Default)]
pub struct SessionLog {
    file: Option<(PathBuf, File)>,
}

impl SessionLog {
    /// Log that writes nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Create `install_<timestamp>.log` in `dir`, creating the directory
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Local::now().format("install_%Y%m%d_%H%M%S.log").to_string());
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Some((path, file)),
        })
    }

    /// Open a log in `dir`, or a disabled one if that fails
    #[must_use]
    pub fn open_or_disabled(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::disabled();
        };
        match Self::create(dir) {
            Ok(log) => log,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "could not open session log");
                Self::disabled()
            }
        }
    }

    /// Path of the log file, if one is open
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// Append one line and flush it
    pub fn line(&mut self, level: LogLevel, message: &str) {
        let Some((path, file)) = self.file.as_mut() else {
            return;
        };
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let written = writeln!(file, "{stamp} [{}] {message}", level.tag()).and_then(|()| file.flush());
        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "session log write failed, closing it");
            self.file = None;
        }
    }

    pub fn info(&mut self, message: &str) {
        self.line(LogLevel::Info, message);
    }

    pub fn error(&mut self, message: &str) {
        self.line(LogLevel::Error, message);
    }
}
