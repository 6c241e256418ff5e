//! PowerShell install script generation
//!
//! Output depends only on the entries passed in, so the same inventory
//! always yields the same bytes.

use std::path::Path;

use tracing::{info, instrument};

use crate::error::InventoryError;
use crate::types::InventoryEntry;

const RULE: &str = "# ============================================================";

/// Flags every generated install directive carries
pub const INSTALL_FLAGS: &str = "--silent --accept-package-agreements --accept-source-agreements";

/// A rendered script with its bucket sizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallScript {
    pub text: String,
    /// Entries installed through winget
    pub via_package_manager: usize,
    /// Entries listed for manual installation
    pub manual: usize,
}

/// Fold line breaks into spaces so a field stays on its own line
pub(crate) fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Install directive for one package identifier
#[must_use]
pub fn install_directive(package_id: &str) -> String {
    format!("winget install --id {} {INSTALL_FLAGS}", single_line(package_id))
}

/// Render the standalone install script for `entries`
#[must_use]
pub fn render_script(entries: &[InventoryEntry]) -> InstallScript {
    let (resolved, manual): (Vec<&InventoryEntry>, Vec<&InventoryEntry>) =
        entries.iter().partition(|e| e.package_id().is_some());

    let mut lines: Vec<String> = vec![
        RULE.to_string(),
        "#  appkeep install script".to_string(),
        format!(
            "#  Apps : {} via winget  |  {} manual",
            resolved.len(),
            manual.len()
        ),
        RULE.to_string(),
        String::new(),
        "# Requires winget (App Installer): https://aka.ms/getwinget".to_string(),
        String::new(),
        "Write-Host '=== appkeep install script ===' -ForegroundColor Cyan".to_string(),
        "Write-Host ''".to_string(),
        String::new(),
    ];

    if !resolved.is_empty() {
        lines.push("# --- winget installs ---------------------------------------".to_string());
        lines.push(String::new());
        for entry in &resolved {
            let mut comment = format!("# {}", single_line(&entry.name));
            if !entry.publisher.is_empty() {
                comment.push_str(&format!("  |  {}", single_line(&entry.publisher)));
            }
            if !entry.version.is_empty() {
                comment.push_str(&format!("  |  v{}", single_line(&entry.version)));
            }
            lines.push(comment);
            lines.push(install_directive(entry.package_id().unwrap_or_default()));
            lines.push(String::new());
        }
    }

    if !manual.is_empty() {
        lines.push("# --- manual installs required -----------------------------".to_string());
        lines.push("# These apps have no winget package and must be installed by hand:".to_string());
        lines.push(String::new());
        for entry in &manual {
            lines.push(format!("# {}", single_line(&entry.name)));
            if !entry.publisher.is_empty() {
                lines.push(format!("#   Publisher : {}", single_line(&entry.publisher)));
            }
            if !entry.version.is_empty() {
                lines.push(format!("#   Version   : {}", single_line(&entry.version)));
            }
            lines.push(String::new());
        }
    }

    lines.push("Write-Host ''".to_string());
    lines.push("Write-Host 'Done! Check output above for any errors.' -ForegroundColor Green".to_string());

    InstallScript {
        text: lines.join("\n") + "\n",
        via_package_manager: resolved.len(),
        manual: manual.len(),
    }
}

/// Bare install directives for every resolved entry, for pasting into a shell
#[must_use]
pub fn install_commands(entries: &[InventoryEntry]) -> String {
    let lines: Vec<String> = entries
        .iter()
        .filter_map(InventoryEntry::package_id)
        .map(install_directive)
        .collect();

    if lines.is_empty() {
        "# No apps with winget IDs selected.".to_string()
    } else {
        lines.join("\n")
    }
}

/// Write the script for `entries` to `path`
///
/// # Errors
/// Returns an error if the file cannot be written.
#[instrument(skip(entries), fields(count = entries.len()))]
pub fn export_script(entries: &[InventoryEntry], path: &Path) -> Result<InstallScript, InventoryError> {
    let script = render_script(entries);
    std::fs::write(path, &script.text).map_err(|e| InventoryError::ExportIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    info!(
        path = %path.display(),
        winget = script.via_package_manager,
        manual = script.manual,
        "exported install script"
    );
    Ok(script)
}
