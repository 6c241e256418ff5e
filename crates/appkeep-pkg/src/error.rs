//! Error types for appkeep-pkg

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during package operations
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// A catalog search could not be run; callers treat it as no result
    #[error("catalog query failed: {0}")]
    CatalogQueryFailed(String),

    /// The installer exceeded its time limit
    #[error("Installation timed out after {} seconds", .0.as_secs())]
    InstallTimeout(Duration),

    /// The installer ran and exited non-zero
    #[error("{message}")]
    InstallNonZeroExit {
        /// Exit status
        status: i32,
        /// Most relevant output line
        message: String,
    },

    /// The installer could not be started or awaited
    #[error("{0}")]
    InstallInvocation(String),
}
