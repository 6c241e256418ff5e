//! Error types for appkeep-inventory

use thiserror::Error;

/// Errors that can occur during inventory operations
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// Registry location could not be opened for lack of rights
    #[error("access denied reading {0}")]
    StoreAccessDenied(String),

    /// Registry location could not be opened for any other reason
    #[error("registry location {location} unavailable: {message}")]
    StoreUnavailable {
        /// Location label
        location: String,
        /// Underlying error text
        message: String,
    },

    /// A single uninstall subkey could not be read
    #[error("malformed uninstall entry {key}: {message}")]
    StoreEntryMalformed {
        /// Subkey name
        key: String,
        /// Underlying error text
        message: String,
    },

    /// Inventory document could not be read or parsed
    #[error("could not import {path}: {message}")]
    ImportParse {
        /// Document path
        path: String,
        /// Parse or I/O error text
        message: String,
    },

    /// Export target could not be written
    #[error("could not write {path}: {message}")]
    ExportIo {
        /// Target path
        path: String,
        /// I/O error text
        message: String,
    },

    /// Entry index outside the store
    #[error("no inventory entry at index {0}")]
    IndexOutOfRange(usize),
}

impl InventoryError {
    /// Check if the registry refused access (elevation may help)
    #[must_use]
    pub fn needs_elevation(&self) -> bool {
        matches!(self, InventoryError::StoreAccessDenied(_))
    }
}
