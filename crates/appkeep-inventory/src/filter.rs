//! Exclusion rules for OS-bundled components

use std::sync::LazyLock;

use regex::RegexSet;

/// Name patterns identifying runtimes, OS updates, drivers and OS-branded apps
const BUILTIN_PATTERNS: &[&str] = &[
    r"microsoft\.net",
    r"microsoft visual c\+\+",
    r"windows sdk",
    r"kb\d{6,}",
    r"update for microsoft",
    r"security update",
    r"microsoft\.directx",
    r"directx",
    r"windows subsystem",
    r"^microsoft windows",
    r"nvidia physx",
    r"^intel\(r\)",
    r"microsoft edge webview",
    r"windows pc health",
];

/// Publishers whose entries are treated as part of the OS
const VENDOR_PUBLISHERS: &[&str] = &["microsoft corporation", "microsoft windows", "windows"];

/// Vendor-published end-user apps kept despite the publisher rule
const VENDOR_ALLOW_LIST: &[&str] = &[
    "microsoft office",
    "microsoft 365",
    "visual studio code",
    "microsoft teams",
    "onedrive",
    "onenote",
    "skype",
];

static BUILTIN_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(BUILTIN_PATTERNS.iter().map(|p| format!("(?i){p}")))
        .unwrap_or_else(|_| RegexSet::empty())
});

/// Why an entry was dropped by the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Name matched a builtin component pattern
    BuiltinName,
    /// Published by the OS vendor and not allow-listed
    VendorPublisher,
}

/// Decide whether an entry is an OS component that should not be inventoried
#[must_use]
pub fn exclusion(name: &str, publisher: &str) -> Option<Exclusion> {
    if BUILTIN_SET.is_match(name) {
        return Some(Exclusion::BuiltinName);
    }

    let publisher = publisher.trim().to_lowercase();
    if VENDOR_PUBLISHERS.contains(&publisher.as_str()) {
        let name = name.to_lowercase();
        if !VENDOR_ALLOW_LIST.iter().any(|app| name.contains(app)) {
            return Some(Exclusion::VendorPublisher);
        }
    }

    None
}

/// Shorthand for `exclusion(..).is_some()`
#[must_use]
pub fn is_builtin(name: &str, publisher: &str) -> bool {
    exclusion(name, publisher).is_some()
}
