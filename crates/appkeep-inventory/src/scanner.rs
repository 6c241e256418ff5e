//! Registry scanner
//!
//! Turns raw uninstall records into a deduplicated, sorted inventory.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::filter;
use crate::registry::UninstallStore;
use crate::types::{InventoryEntry, SourceHive, UninstallRecord};

/// Scan every uninstall location and return the inventory
///
/// Never fails: unreadable locations and entries are logged and skipped.
#[instrument(skip(store))]
pub fn scan(store: &dyn UninstallStore) -> Vec<InventoryEntry> {
    info!("scanning installed applications");

    let mut entries = Vec::new();

    for hive in SourceHive::SCAN_ORDER {
        match store.read_location(hive) {
            Ok(records) => {
                let before = entries.len();
                for record in records {
                    match record {
                        Ok(record) => {
                            if let Some(entry) = accept(record, hive) {
                                entries.push(entry);
                            }
                        }
                        Err(e) => debug!(location = %hive, error = %e, "skipping uninstall entry"),
                    }
                }
                debug!(location = %hive, kept = entries.len() - before, "location scanned");
            }
            Err(e) if e.needs_elevation() => {
                warn!(location = %hive, error = %e, "skipping registry location, run elevated to include it");
            }
            Err(e) => warn!(location = %hive, error = %e, "skipping registry location"),
        }
    }

    let entries = dedup_sorted(entries);
    info!(count = entries.len(), "scan completed");
    entries
}

/// Apply the per-record rules: named, not a system component, not builtin
fn accept(record: UninstallRecord, hive: SourceHive) -> Option<InventoryEntry> {
    if record.display_name.trim().is_empty() || record.system_component {
        return None;
    }

    let entry = record.into_entry(hive);
    if let Some(reason) = filter::exclusion(&entry.name, &entry.publisher) {
        debug!(name = %entry.name, reason = ?reason, "excluded builtin component");
        return None;
    }
    Some(entry)
}

/// Keep the first entry per case-insensitive name, then sort by that name
#[must_use]
pub fn dedup_sorted(entries: Vec<InventoryEntry>) -> Vec<InventoryEntry> {
    let mut seen = HashSet::new();
    let mut unique: Vec<InventoryEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.key()))
        .collect();

    unique.sort_by_cached_key(InventoryEntry::key);
    unique
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::InventoryError;
    use crate::registry::LocationRecords;

    #[derive(Default)]
    struct FakeRegistry {
        locations: HashMap<SourceHive, Vec<UninstallRecord>>,
        denied: Vec<SourceHive>,
        broken_entries: usize,
    }

    impl FakeRegistry {
        fn with(mut self, hive: SourceHive, records: Vec<UninstallRecord>) -> Self {
            self.locations.insert(hive, records);
            self
        }
    }

    impl UninstallStore for FakeRegistry {
        fn read_location(&self, hive: SourceHive) -> Result<LocationRecords, InventoryError> {
            if self.denied.contains(&hive) {
                return Err(InventoryError::StoreAccessDenied(hive.label().to_string()));
            }
            let mut records: LocationRecords = self
                .locations
                .get(&hive)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(Ok)
                .collect();
            for n in 0..self.broken_entries {
                records.push(Err(InventoryError::StoreEntryMalformed {
                    key: format!("broken-{n}"),
                    message: "access denied".to_string(),
                }));
            }
            Ok(records)
        }
    }

    fn names(entries: &[InventoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_scan_sorts_case_insensitively() {
        let registry = FakeRegistry::default().with(
            SourceHive::Hklm64,
            vec![
                UninstallRecord::named("zoom"),
                UninstallRecord::named("Audacity 3.4"),
                UninstallRecord::named("blender"),
            ],
        );

        let entries = scan(&registry);
        assert_eq!(names(&entries), vec!["Audacity 3.4", "blender", "zoom"]);
    }

    #[test]
    fn test_first_occurrence_wins_across_locations() {
        let registry = FakeRegistry::default()
            .with(
                SourceHive::Hklm32,
                vec![UninstallRecord::named("Git").with_publisher("32-bit")],
            )
            .with(
                SourceHive::Hklm64,
                vec![UninstallRecord::named("git").with_publisher("64-bit")],
            )
            .with(
                SourceHive::Hkcu,
                vec![UninstallRecord::named("GIT").with_publisher("user")],
            );

        let entries = scan(&registry);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].publisher, "64-bit");
        assert_eq!(entries[0].source, SourceHive::Hklm64);
    }

    #[test]
    fn test_skips_nameless_system_and_builtin_entries() {
        let mut system = UninstallRecord::named("Hidden Helper");
        system.system_component = true;

        let registry = FakeRegistry::default().with(
            SourceHive::Hklm64,
            vec![
                UninstallRecord::named("   "),
                system,
                UninstallRecord::named("Microsoft Visual C++ 2015 Redistributable")
                    .with_publisher("Microsoft Corporation"),
                UninstallRecord::named("Microsoft Teams").with_publisher("Microsoft Corporation"),
                UninstallRecord::named("VLC media player").with_publisher("VideoLAN"),
            ],
        );

        let entries = scan(&registry);
        assert_eq!(names(&entries), vec!["Microsoft Teams", "VLC media player"]);
    }

    #[test]
    fn test_denied_location_is_skipped() {
        let mut registry = FakeRegistry::default()
            .with(SourceHive::Hklm64, vec![UninstallRecord::named("Firefox")])
            .with(SourceHive::Hkcu, vec![UninstallRecord::named("Spotify")]);
        registry.denied.push(SourceHive::Hklm64);

        let entries = scan(&registry);
        assert_eq!(names(&entries), vec!["Spotify"]);
    }

    #[test]
    fn test_broken_entries_only_skip_themselves() {
        let mut registry =
            FakeRegistry::default().with(SourceHive::Hkcu, vec![UninstallRecord::named("Spotify")]);
        registry.broken_entries = 2;

        let entries = scan(&registry);
        assert_eq!(names(&entries), vec!["Spotify"]);
    }

    #[test]
    fn test_scan_with_nothing_readable_is_empty() {
        let mut registry = FakeRegistry::default();
        registry.denied = SourceHive::SCAN_ORDER.to_vec();

        assert!(scan(&registry).is_empty());
    }
}
