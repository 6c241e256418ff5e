//! appkeep-inventory: installed-software inventory
//!
//! Scans the Windows uninstall registry into an inventory store and moves
//! that inventory between machines as a JSON document, an install script
//! and a readable listing.

pub mod bundle;
pub mod document;
pub mod error;
pub mod filter;
pub mod registry;
pub mod scanner;
pub mod script;
pub mod store;
pub mod types;

pub use error::InventoryError;
pub use registry::{UninstallStore, WindowsRegistry};
pub use store::{InventoryStore, SortKey};
pub use types::{
    InstallOutcome, InstallState, InstallStatus, InstallSummary, InventoryEntry, MatchState,
    MatchStatus, MatchSummary, SourceHive, UninstallRecord,
};
