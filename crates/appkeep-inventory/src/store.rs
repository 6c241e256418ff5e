//! Inventory store: the owned record set the workers update by index

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::scanner::dedup_sorted;
use crate::types::{
    InstallOutcome, InstallState, InstallStatus, InstallSummary, InventoryEntry, MatchState,
    MatchStatus, MatchSummary,
};

/// Sort orders offered to the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    Publisher,
    Source,
}

/// Ordered set of entries with case-insensitively unique names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryStore {
    entries: Vec<InventoryEntry>,
}

impl InventoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store, dropping later duplicates and sorting by name
    #[must_use]
    pub fn from_entries(entries: Vec<InventoryEntry>) -> Self {
        Self {
            entries: dedup_sorted(entries),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&InventoryEntry> {
        self.entries.get(index)
    }

    /// Replace the whole record set
    pub fn replace(&mut self, entries: Vec<InventoryEntry>) {
        self.entries = dedup_sorted(entries);
    }

    /// Check every index before a batch starts
    ///
    /// # Errors
    /// Returns the first index that is out of range.
    pub fn check_indices(&self, indices: &[usize]) -> Result<(), InventoryError> {
        match indices.iter().find(|&&i| i >= self.entries.len()) {
            Some(&bad) => Err(InventoryError::IndexOutOfRange(bad)),
            None => Ok(()),
        }
    }

    /// Entries at `indices`, in the given order
    ///
    /// # Errors
    /// Returns an error if any index is out of range.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<(usize, InventoryEntry)>, InventoryError> {
        self.check_indices(indices)?;
        Ok(indices
            .iter()
            .map(|&i| (i, self.entries[i].clone()))
            .collect())
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut InventoryEntry, InventoryError> {
        self.entries
            .get_mut(index)
            .ok_or(InventoryError::IndexOutOfRange(index))
    }

    /// Update the match field group of one entry
    ///
    /// # Errors
    /// Returns an error if the index is out of range.
    pub fn set_match(&mut self, index: usize, state: MatchState) -> Result<(), InventoryError> {
        self.entry_mut(index)?.match_state = state;
        Ok(())
    }

    /// Update the install field group of one entry
    ///
    /// # Errors
    /// Returns an error if the index is out of range.
    pub fn set_install(&mut self, index: usize, state: InstallState) -> Result<(), InventoryError> {
        self.entry_mut(index)?.install_state = state;
        Ok(())
    }

    /// Indices of entries whose name or publisher contains `query`, case-insensitively
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                query.is_empty()
                    || e.name.to_lowercase().contains(&query)
                    || e.publisher.to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Reorder entries
    ///
    /// Invalidates previously handed out indices.
    pub fn sort_by(&mut self, key: SortKey) {
        match key {
            SortKey::NameAsc => self.entries.sort_by_cached_key(InventoryEntry::key),
            SortKey::NameDesc => {
                self.entries.sort_by_cached_key(InventoryEntry::key);
                self.entries.reverse();
            }
            SortKey::Publisher => self.entries.sort_by_cached_key(|e| e.publisher.to_lowercase()),
            SortKey::Source => self.entries.sort_by_key(|e| e.source.label()),
        }
    }

    /// Counts of finished installs by outcome
    #[must_use]
    pub fn install_summary(&self) -> InstallSummary {
        let mut summary = InstallSummary::default();
        for entry in &self.entries {
            match &entry.install_state {
                InstallState::Done(InstallOutcome::Success) => summary.succeeded += 1,
                InstallState::Done(InstallOutcome::Failed(_)) => summary.failed += 1,
                InstallState::Done(InstallOutcome::Manual) => summary.manual += 1,
                _ => {}
            }
        }
        summary
    }

    /// Counts of entries by match status
    #[must_use]
    pub fn match_summary(&self) -> MatchSummary {
        let mut summary = MatchSummary::default();
        for entry in &self.entries {
            match entry.match_state.status() {
                MatchStatus::Found => summary.found += 1,
                MatchStatus::NotFound => summary.not_found += 1,
                MatchStatus::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    /// Plain-text report of every entry that went through an install run
    #[must_use]
    pub fn results_report(&self, generated_at: &str) -> String {
        let mut out = format!("Install results - {generated_at}\n{}\n", "=".repeat(60));
        for entry in &self.entries {
            let status = entry.install_state.status();
            if status == InstallStatus::Empty {
                continue;
            }
            let label = status.to_string().to_uppercase();
            let _ = writeln!(
                out,
                "[{label:<10}]  {}  ({})",
                entry.name,
                entry.package_id().unwrap_or_default()
            );
            if let Some(error) = entry.install_state.error() {
                let _ = writeln!(out, "              Error: {error}");
            }
        }
        out
    }
}
