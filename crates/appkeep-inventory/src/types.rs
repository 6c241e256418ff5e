//! Inventory type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message attached to entries finished without invoking the installer
pub const MANUAL_INSTALL_MESSAGE: &str = "No package available";

// ============================================================================
// Provenance
// ============================================================================

/// Registry location an entry was read from
///
/// Provenance only, never part of an entry's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceHive {
    /// Machine-wide store, 64-bit view
    #[serde(rename = "HKLM64", alias = "HKLM x64")]
    Hklm64,
    /// Machine-wide store, 32-bit view
    #[serde(rename = "HKLM32", alias = "HKLM x86")]
    Hklm32,
    /// Current user store
    #[serde(rename = "HKCU")]
    Hkcu,
}

impl SourceHive {
    /// Scan order: machine-wide views before the user store
    pub const SCAN_ORDER: [SourceHive; 3] = [SourceHive::Hklm64, SourceHive::Hklm32, SourceHive::Hkcu];

    /// Short label used in documents and listings
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceHive::Hklm64 => "HKLM64",
            SourceHive::Hklm32 => "HKLM32",
            SourceHive::Hkcu => "HKCU",
        }
    }
}

impl fmt::Display for SourceHive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Match state
// ============================================================================

/// Flat match status as it appears in documents and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Not matched yet
    Unknown,
    /// Resolved to a package identifier
    Found,
    /// Catalog had no usable result
    NotFound,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Unknown => write!(f, "unknown"),
            MatchStatus::Found => write!(f, "found"),
            MatchStatus::NotFound => write!(f, "not_found"),
        }
    }
}

/// Result of reconciling an entry against the package catalog
///
/// `Found` always carries a non-empty identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum MatchState {
    #[default]
    Unknown,
    Found(String),
    NotFound,
}

impl MatchState {
    /// Build a match state from a catalog lookup
    ///
    /// A missing or blank identifier means the package was not found.
    #[must_use]
    pub fn from_lookup(package_id: Option<&str>) -> Self {
        match package_id.map(str::trim) {
            Some(id) if !id.is_empty() => MatchState::Found(id.to_string()),
            _ => MatchState::NotFound,
        }
    }

    /// Resolved package identifier, if any
    #[must_use]
    pub fn package_id(&self) -> Option<&str> {
        match self {
            MatchState::Found(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> MatchStatus {
        match self {
            MatchState::Unknown => MatchStatus::Unknown,
            MatchState::Found(_) => MatchStatus::Found,
            MatchState::NotFound => MatchStatus::NotFound,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, MatchState::Found(_))
    }
}

// ============================================================================
// Install state
// ============================================================================

/// Flat install status as it appears in documents and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStatus {
    #[serde(rename = "", alias = "pending")]
    Empty,
    Installing,
    Success,
    Failed,
    Manual,
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStatus::Empty => Ok(()),
            InstallStatus::Installing => write!(f, "installing"),
            InstallStatus::Success => write!(f, "success"),
            InstallStatus::Failed => write!(f, "failed"),
            InstallStatus::Manual => write!(f, "manual"),
        }
    }
}

/// Terminal result of one install attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstallOutcome {
    /// Installer exited with code 0
    Success,
    /// Installer failed, timed out or could not be started
    Failed(String),
    /// No package identifier; the installer was never invoked
    Manual,
}

impl InstallOutcome {
    #[must_use]
    pub fn status(&self) -> InstallStatus {
        match self {
            InstallOutcome::Success => InstallStatus::Success,
            InstallOutcome::Failed(_) => InstallStatus::Failed,
            InstallOutcome::Manual => InstallStatus::Manual,
        }
    }

    /// Text reported alongside the outcome
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            InstallOutcome::Success => "",
            InstallOutcome::Failed(error) => error,
            InstallOutcome::Manual => MANUAL_INSTALL_MESSAGE,
        }
    }
}

/// Install lifecycle of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum InstallState {
    #[default]
    NotStarted,
    Installing,
    Done(InstallOutcome),
}

impl InstallState {
    #[must_use]
    pub fn status(&self) -> InstallStatus {
        match self {
            InstallState::NotStarted => InstallStatus::Empty,
            InstallState::Installing => InstallStatus::Installing,
            InstallState::Done(outcome) => outcome.status(),
        }
    }

    /// Error text; only failed installs carry one
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            InstallState::Done(InstallOutcome::Failed(error)) => Some(error),
            _ => None,
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// One discovered or imported application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    /// Display name, the identity key
    pub name: String,
    pub publisher: String,
    pub version: String,
    pub uninstall_command: String,
    pub install_path: String,
    /// Where the entry was found
    pub source: SourceHive,
    /// Written by the matcher only
    pub match_state: MatchState,
    /// Written by the install orchestrator only
    pub install_state: InstallState,
}

impl InventoryEntry {
    /// Create an entry with empty metadata and fresh state
    pub fn new(name: impl Into<String>, source: SourceHive) -> Self {
        Self {
            name: name.into(),
            publisher: String::new(),
            version: String::new(),
            uninstall_command: String::new(),
            install_path: String::new(),
            source,
            match_state: MatchState::Unknown,
            install_state: InstallState::NotStarted,
        }
    }

    /// Set publisher
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Set version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set match state
    #[must_use]
    pub fn with_match(mut self, state: MatchState) -> Self {
        self.match_state = state;
        self
    }

    /// Case-insensitive identity key
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    #[must_use]
    pub fn package_id(&self) -> Option<&str> {
        self.match_state.package_id()
    }
}

/// Raw values read from one uninstall subkey
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallRecord {
    pub display_name: String,
    pub publisher: String,
    pub display_version: String,
    pub uninstall_string: String,
    pub install_location: String,
    /// `SystemComponent` flag
    pub system_component: bool,
}

impl UninstallRecord {
    /// Create a record with only a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: name.into(),
            ..Self::default()
        }
    }

    /// Set publisher
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Convert into an entry, trimming every value
    #[must_use]
    pub fn into_entry(self, source: SourceHive) -> InventoryEntry {
        InventoryEntry {
            name: self.display_name.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            version: self.display_version.trim().to_string(),
            uninstall_command: self.uninstall_string.trim().to_string(),
            install_path: self.install_location.trim().to_string(),
            source,
            match_state: MatchState::Unknown,
            install_state: InstallState::NotStarted,
        }
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// Counts of install outcomes across a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InstallSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub manual: usize,
}

impl InstallSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.succeeded == 0 && self.failed == 0 && self.manual == 0
    }
}

/// Counts of match results across a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub found: usize,
    pub not_found: usize,
    pub unknown: usize,
}
