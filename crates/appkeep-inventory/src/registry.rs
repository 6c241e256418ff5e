//! Access to the Windows uninstall registry

use crate::error::InventoryError;
use crate::types::{SourceHive, UninstallRecord};

/// Registry path holding one subkey per installed program
pub const UNINSTALL_PATH: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

/// Subkeys read from one location; each may have failed individually
pub type LocationRecords = Vec<Result<UninstallRecord, InventoryError>>;

/// Source of uninstall records
///
/// The outer error means the whole location could not be opened; inner
/// errors cover single subkeys.
pub trait UninstallStore: Send + Sync {
    /// Read every subkey under the uninstall path of `hive`
    fn read_location(&self, hive: SourceHive) -> Result<LocationRecords, InventoryError>;
}

/// The machine's registry, read through `winreg`
#[derive(Debug, Clone, Default)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
mod imp {
    use std::io;

    use winreg::RegKey;
    use winreg::enums::{
        HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_32KEY, KEY_WOW64_64KEY,
    };

    use super::{LocationRecords, UNINSTALL_PATH, UninstallStore, WindowsRegistry};
    use crate::error::InventoryError;
    use crate::types::{SourceHive, UninstallRecord};

    fn open_error(hive: SourceHive, err: &io::Error) -> InventoryError {
        if err.kind() == io::ErrorKind::PermissionDenied {
            InventoryError::StoreAccessDenied(hive.label().to_string())
        } else {
            InventoryError::StoreUnavailable {
                location: hive.label().to_string(),
                message: err.to_string(),
            }
        }
    }

    fn string_value(key: &RegKey, name: &str) -> String {
        key.get_value::<String, _>(name).unwrap_or_default()
    }

    // Some installers write the flag as REG_SZ
    fn flag_value(key: &RegKey, name: &str) -> bool {
        if let Ok(value) = key.get_value::<u32, _>(name) {
            return value != 0;
        }
        key.get_value::<String, _>(name)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .is_some_and(|v| v != 0)
    }

    fn read_subkey(parent: &RegKey, name: &str, flags: u32) -> Result<UninstallRecord, InventoryError> {
        let sub = parent
            .open_subkey_with_flags(name, flags)
            .map_err(|e| InventoryError::StoreEntryMalformed {
                key: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(UninstallRecord {
            display_name: string_value(&sub, "DisplayName"),
            publisher: string_value(&sub, "Publisher"),
            display_version: string_value(&sub, "DisplayVersion"),
            uninstall_string: string_value(&sub, "UninstallString"),
            install_location: string_value(&sub, "InstallLocation"),
            system_component: flag_value(&sub, "SystemComponent"),
        })
    }

    impl UninstallStore for WindowsRegistry {
        fn read_location(&self, hive: SourceHive) -> Result<LocationRecords, InventoryError> {
            let (root, flags) = match hive {
                SourceHive::Hklm64 => (HKEY_LOCAL_MACHINE, KEY_READ | KEY_WOW64_64KEY),
                SourceHive::Hklm32 => (HKEY_LOCAL_MACHINE, KEY_READ | KEY_WOW64_32KEY),
                SourceHive::Hkcu => (HKEY_CURRENT_USER, KEY_READ),
            };

            let key = RegKey::predef(root)
                .open_subkey_with_flags(UNINSTALL_PATH, flags)
                .map_err(|e| open_error(hive, &e))?;

            let records = key
                .enum_keys()
                .map(|name| match name {
                    Ok(name) => read_subkey(&key, &name, flags),
                    Err(e) => Err(InventoryError::StoreEntryMalformed {
                        key: "<unreadable>".to_string(),
                        message: e.to_string(),
                    }),
                })
                .collect();

            Ok(records)
        }
    }
}

#[cfg(not(windows))]
impl UninstallStore for WindowsRegistry {
    fn read_location(&self, hive: SourceHive) -> Result<LocationRecords, InventoryError> {
        Err(InventoryError::StoreUnavailable {
            location: hive.label().to_string(),
            message: "the uninstall registry only exists on Windows".to_string(),
        })
    }
}
