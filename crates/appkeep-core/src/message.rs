//! Message types for actor communication
//!
//! Message handlers are implemented in their respective actor modules.

use appkeep_inventory::{
    InstallState, InstallSummary, InventoryEntry, MatchState, MatchSummary, SortKey,
};
use kameo_macros::Reply;

// ============================================================================
// StoreActor Messages
// ============================================================================

/// Clone of every entry, in store order
#[derive(Debug)]
pub struct Snapshot;

/// Replace the whole record set (scan or import)
#[derive(Debug)]
pub struct ReplaceEntries {
    /// New entries; duplicates are dropped and the rest sorted by name
    pub entries: Vec<InventoryEntry>,
}

/// Look up the entries a worker will process
#[derive(Debug)]
pub struct SelectEntries {
    /// Store indices, in processing order
    pub indices: Vec<usize>,
}

/// Entries picked by [`SelectEntries`]
#[derive(Debug, Clone, Reply)]
pub struct Selection {
    /// `(index, entry)` pairs in the requested order
    pub entries: Vec<(usize, InventoryEntry)>,
    /// First requested index outside the store; `entries` is empty when set
    pub out_of_range: Option<usize>,
}

/// Record a match result
#[derive(Debug)]
pub struct ApplyMatch {
    pub index: usize,
    pub state: MatchState,
}

/// Record an install state change
#[derive(Debug)]
pub struct ApplyInstall {
    pub index: usize,
    pub state: InstallState,
}

/// Indices of entries whose name or publisher contains `query`
#[derive(Debug)]
pub struct FilterEntries {
    pub query: String,
}

/// Reorder the store
#[derive(Debug)]
pub struct SortEntries {
    pub key: SortKey,
}

/// Counts of match and install results
#[derive(Debug)]
pub struct GetSummaries;

/// Reply to [`GetSummaries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reply)]
pub struct Summaries {
    pub matched: MatchSummary,
    pub installed: InstallSummary,
}

/// Plain-text install results report
#[derive(Debug)]
pub struct ResultsReport {
    /// Timestamp printed in the report header
    pub generated_at: String,
}
