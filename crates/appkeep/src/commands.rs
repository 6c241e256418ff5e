//! Subcommand implementations

use std::path::{Path, PathBuf};

use appkeep_core::{InstallEvent, MatchEvent, Vault};
use appkeep_inventory::{InstallOutcome, InventoryEntry, MatchStatus, SortKey};
use chrono::Local;
use color_eyre::Result;
use eyre::WrapErr;
use tracing::info;

/// All indices when none were given
fn selection(indices: Vec<usize>, len: usize) -> Vec<usize> {
    if indices.is_empty() {
        (0..len).collect()
    } else {
        indices
    }
}

async fn load(vault: &Vault, inventory: &Path) -> Result<Vec<InventoryEntry>> {
    vault
        .import_document(inventory)
        .await
        .wrap_err_with(|| format!("could not load inventory {}", inventory.display()))?;
    Ok(vault.snapshot().await?)
}

pub async fn scan(vault: &Vault, inventory: &Path) -> Result<()> {
    let count = vault.scan().await?;
    vault.export_document(&[], inventory).await?;
    println!("Found {count} apps, saved to {}", inventory.display());
    Ok(())
}

pub async fn list(vault: &Vault, inventory: &Path, filter: Option<&str>, sort: SortKey) -> Result<()> {
    let original = load(vault, inventory).await?;
    vault.sort(sort).await?;
    let sorted = vault.snapshot().await?;
    let shown = vault.filter(filter.unwrap_or_default()).await?;

    println!("{:>4}  {:<40} {:<16} {:<24} {}", "#", "NAME", "VERSION", "PUBLISHER", "WINGET");
    for i in shown {
        let Some(entry) = sorted.get(i) else {
            continue;
        };
        // indices refer to the document order other commands load
        let index = original
            .iter()
            .position(|e| e.key() == entry.key())
            .unwrap_or(i);
        let winget = match entry.match_state.status() {
            MatchStatus::Found => entry.package_id().unwrap_or_default().to_string(),
            MatchStatus::NotFound => "(not found)".to_string(),
            MatchStatus::Unknown => String::new(),
        };
        println!(
            "{index:>4}  {:<40} {:<16} {:<24} {winget}",
            entry.name, entry.version, entry.publisher
        );
    }
    Ok(())
}

pub async fn match_packages(vault: &Vault, inventory: &Path, indices: Vec<usize>) -> Result<()> {
    let entries = load(vault, inventory).await?;
    let indices = selection(indices, entries.len());

    let mut handle = vault.match_packages(&indices).await?;
    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next().await {
        match event {
            MatchEvent::Matched {
                index,
                status,
                package_id,
            } => {
                let name = entries.get(index).map_or("?", |e| e.name.as_str());
                match status {
                    MatchStatus::Found => println!("  found      {name} -> {package_id}"),
                    _ => println!("  not found  {name}"),
                }
            }
            MatchEvent::Progress { processed, total } => {
                info!(processed, total, "match progress");
            }
            MatchEvent::Completed { cancelled } => {
                if cancelled {
                    println!("Match cancelled");
                }
            }
        }
    }

    let summary = vault.summaries().await?.matched;
    vault.export_document(&[], inventory).await?;
    println!(
        "{} found, {} not found, {} unmatched; saved to {}",
        summary.found,
        summary.not_found,
        summary.unknown,
        inventory.display()
    );
    Ok(())
}

pub async fn install(
    vault: &Vault,
    inventory: &Path,
    indices: Vec<usize>,
    report: Option<&Path>,
) -> Result<()> {
    let entries = load(vault, inventory).await?;
    let indices = selection(indices, entries.len());

    let mut handle = vault.install(&indices).await?;
    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Stopping after the current install...");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next().await {
        match event {
            InstallEvent::LogLine(line) => println!("{line}"),
            InstallEvent::Finished {
                index,
                outcome: InstallOutcome::Manual,
            } => {
                let name = entries.get(index).map_or("?", |e| e.name.as_str());
                println!("  {name}: {}", InstallOutcome::Manual.message());
            }
            InstallEvent::OverallProgress { done, total } => println!("  [{done}/{total}]"),
            InstallEvent::Completed { cancelled: true } => println!("Install cancelled"),
            _ => {}
        }
    }

    let summary = vault.summaries().await?.installed;
    println!(
        "{} succeeded, {} failed, {} manual",
        summary.succeeded, summary.failed, summary.manual
    );

    if let Some(path) = report {
        let text = vault
            .results_report(&Local::now().format("%Y-%m-%d %H:%M").to_string())
            .await?;
        std::fs::write(path, text).wrap_err_with(|| format!("writing {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

pub async fn script(
    vault: &Vault,
    inventory: &Path,
    indices: &[usize],
    output: &Path,
    bare: bool,
) -> Result<()> {
    load(vault, inventory).await?;
    if bare {
        println!("{}", vault.install_commands(indices).await?);
        return Ok(());
    }
    let script = vault.export_script(indices, output).await?;
    println!(
        "Wrote {}: {} via winget, {} manual",
        output.display(),
        script.via_package_manager,
        script.manual
    );
    Ok(())
}

pub async fn bundle(
    vault: &Vault,
    inventory: &Path,
    indices: &[usize],
    dir: Option<PathBuf>,
) -> Result<()> {
    load(vault, inventory).await?;
    let dir = dir.unwrap_or_else(|| {
        PathBuf::from(format!("appkeep_bundle_{}", Local::now().format("%Y%m%d_%H%M")))
    });
    let written = vault.export_bundle(indices, &dir).await?;
    for (name, path) in written {
        println!("  {name:<16} {}", path.display());
    }
    Ok(())
}

pub async fn report(vault: &Vault, inventory: &Path) -> Result<()> {
    let entries = load(vault, inventory).await?;
    let summary = vault.summaries().await?.matched;
    println!(
        "{} apps: {} with winget ids, {} not found, {} unmatched\n",
        entries.len(),
        summary.found,
        summary.not_found,
        summary.unknown
    );
    println!("{}", vault.install_commands(&[]).await?);
    Ok(())
}
