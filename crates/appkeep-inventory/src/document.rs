//! Portable inventory document (JSON)

use std::collections::HashSet;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::InventoryError;
use crate::types::{InstallState, InstallStatus, InventoryEntry, MatchState, MatchStatus, SourceHive};

/// Document format version written by this crate
pub const DOCUMENT_VERSION: &str = "1.0";

/// Top-level exported document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDocument {
    /// Format version tag
    #[serde(default)]
    pub version: String,
    /// When the document was written; informational, kept as written
    #[serde(default)]
    pub exported_at: Option<String>,
    /// One record per entry, in store order
    #[serde(default)]
    pub apps: Vec<EntryRecord>,
}

/// Flat, string-typed form of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub name: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub uninstall_command: String,
    #[serde(default)]
    pub install_path: String,
    #[serde(default = "default_source")]
    pub source_hive: SourceHive,
    #[serde(default)]
    pub package_id: String,
    #[serde(default = "default_match_status")]
    pub match_status: MatchStatus,
    #[serde(default = "default_install_status")]
    pub install_status: InstallStatus,
    #[serde(default)]
    pub install_error: String,
}

fn default_source() -> SourceHive {
    SourceHive::Hklm64
}

fn default_match_status() -> MatchStatus {
    MatchStatus::Unknown
}

fn default_install_status() -> InstallStatus {
    InstallStatus::Empty
}

impl From<&InventoryEntry> for EntryRecord {
    fn from(entry: &InventoryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            publisher: entry.publisher.clone(),
            version: entry.version.clone(),
            uninstall_command: entry.uninstall_command.clone(),
            install_path: entry.install_path.clone(),
            source_hive: entry.source,
            package_id: entry.package_id().unwrap_or_default().to_string(),
            match_status: entry.match_state.status(),
            install_status: entry.install_state.status(),
            install_error: entry.install_state.error().unwrap_or_default().to_string(),
        }
    }
}

impl EntryRecord {
    /// Convert to an entry for a new machine: match state kept, install state reset
    fn into_imported_entry(self) -> InventoryEntry {
        let match_state = match self.match_status {
            MatchStatus::Found => match self.package_id.trim() {
                "" => MatchState::Unknown,
                id => MatchState::Found(id.to_string()),
            },
            MatchStatus::NotFound => MatchState::NotFound,
            MatchStatus::Unknown => MatchState::Unknown,
        };

        InventoryEntry {
            name: self.name,
            publisher: self.publisher,
            version: self.version,
            uninstall_command: self.uninstall_command,
            install_path: self.install_path,
            source: self.source_hive,
            match_state,
            install_state: InstallState::NotStarted,
        }
    }
}

impl InventoryDocument {
    /// Build a document for `entries`, stamped now
    #[must_use]
    pub fn from_entries(entries: &[InventoryEntry]) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            exported_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            apps: entries.iter().map(EntryRecord::from).collect(),
        }
    }

    /// Parse document text
    ///
    /// # Errors
    /// Returns the JSON error text, or a message naming an entry without a name.
    pub fn parse(text: &str) -> Result<Self, String> {
        let document: InventoryDocument = serde_json::from_str(text).map_err(|e| e.to_string())?;
        if let Some(pos) = document.apps.iter().position(|r| r.name.trim().is_empty()) {
            return Err(format!("entry {pos} has an empty name"));
        }
        Ok(document)
    }

    /// Entries ready for a new machine
    ///
    /// Later duplicates by case-insensitive name are dropped.
    #[must_use]
    pub fn into_entries(self) -> Vec<InventoryEntry> {
        let mut seen = HashSet::new();
        self.apps
            .into_iter()
            .map(EntryRecord::into_imported_entry)
            .filter(|entry| seen.insert(entry.key()))
            .collect()
    }
}

/// Render the document for `entries` as pretty JSON
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_document(entries: &[InventoryEntry]) -> Result<String, InventoryError> {
    serde_json::to_string_pretty(&InventoryDocument::from_entries(entries)).map_err(|e| {
        InventoryError::ExportIo {
            path: "<document>".to_string(),
            message: e.to_string(),
        }
    })
}

/// Write the document for `entries` to `path`
///
/// # Errors
/// Returns an error if the file cannot be written.
#[instrument(skip(entries), fields(count = entries.len()))]
pub fn export_document(entries: &[InventoryEntry], path: &Path) -> Result<(), InventoryError> {
    let text = render_document(entries)?;
    std::fs::write(path, text).map_err(|e| InventoryError::ExportIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    info!(path = %path.display(), "exported inventory document");
    Ok(())
}

/// Read a previously exported document
///
/// Nothing is returned unless the whole document parses.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
#[instrument]
pub fn import_document(path: &Path) -> Result<Vec<InventoryEntry>, InventoryError> {
    let import_error = |message: String| InventoryError::ImportParse {
        path: path.display().to_string(),
        message,
    };

    let text = std::fs::read_to_string(path).map_err(|e| import_error(e.to_string()))?;
    let document = InventoryDocument::parse(&text).map_err(import_error)?;

    if document.version != DOCUMENT_VERSION {
        warn!(version = %document.version, "importing document with a different version tag");
    }
    debug!(exported_at = ?document.exported_at, "document parsed");

    let entries = document.into_entries();
    info!(count = entries.len(), "imported inventory document");
    Ok(entries)
}
