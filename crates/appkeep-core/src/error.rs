//! Core error types for appkeep-core

use appkeep_inventory::InventoryError;
use thiserror::Error;

/// Errors that can occur in core operations
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Another scan, match, install or import is still running
    #[error("another operation is already running")]
    Busy,

    /// The package manager did not answer its availability probe
    #[error("package manager unavailable: {0}")]
    PackageManagerUnavailable(String),

    /// Inventory store, codec or scanner failure
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// A blocking task panicked or was cancelled
    #[error("background task failed: {0}")]
    TaskFailed(String),

    /// Actor communication error
    #[error("actor communication error: {0}")]
    ActorError(String),
}
