//! Error types for appkeep-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running an external program
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Program is not installed or not on PATH
    #[error("program not found: {0}")]
    NotFound(String),

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),
}
