//! Export bundle: document, script and a readable listing in one directory

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, instrument};

use crate::document::export_document;
use crate::error::InventoryError;
use crate::script::{export_script, single_line};
use crate::types::InventoryEntry;

pub const DOCUMENT_FILE: &str = "inventory.json";
pub const SCRIPT_FILE: &str = "install.ps1";
pub const LISTING_FILE: &str = "app_list.txt";

/// Human-readable listing of `entries`
#[must_use]
pub fn render_listing(entries: &[InventoryEntry], generated_at: &str) -> String {
    let mut out = format!(
        "appkeep exported app list\nGenerated: {generated_at}\n{}\n\n",
        "=".repeat(60)
    );
    for entry in entries {
        let _ = writeln!(out, "  {}", single_line(&entry.name));
        if !entry.publisher.is_empty() {
            let _ = writeln!(out, "    Publisher  : {}", single_line(&entry.publisher));
        }
        if !entry.version.is_empty() {
            let _ = writeln!(out, "    Version    : {}", single_line(&entry.version));
        }
        match entry.package_id() {
            Some(id) => {
                let _ = writeln!(out, "    Winget ID  : {}", single_line(id));
            }
            None => out.push_str("    Winget     : Manual install required\n"),
        }
        out.push('\n');
    }
    out
}

/// Write the three bundle files into `dir`, creating it if needed
///
/// Returns the written paths keyed by file name.
///
/// # Errors
/// Returns an error if the directory or any file cannot be written.
#[instrument(skip(entries), fields(count = entries.len()))]
pub fn export_bundle(
    entries: &[InventoryEntry],
    dir: &Path,
) -> Result<BTreeMap<String, PathBuf>, InventoryError> {
    let io_error = |path: &Path, e: std::io::Error| InventoryError::ExportIo {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let mut written = BTreeMap::new();

    let document = dir.join(DOCUMENT_FILE);
    export_document(entries, &document)?;
    written.insert(DOCUMENT_FILE.to_string(), document);

    let script = dir.join(SCRIPT_FILE);
    export_script(entries, &script)?;
    written.insert(SCRIPT_FILE.to_string(), script);

    let listing = dir.join(LISTING_FILE);
    let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
    std::fs::write(&listing, render_listing(entries, &generated_at))
        .map_err(|e| io_error(&listing, e))?;
    written.insert(LISTING_FILE.to_string(), listing);

    info!(dir = %dir.display(), "exported bundle");
    Ok(written)
}
