//! `Vault`: the driver-facing facade
//!
//! Owns the store actor and the single-worker guard. Scan, match, install,
//! import and sort each take the guard; a second caller gets
//! [`CoreError::Busy`] instead of waiting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use appkeep_inventory::bundle::export_bundle;
use appkeep_inventory::document::{export_document, import_document};
use appkeep_inventory::script::{export_script, install_commands, InstallScript};
use appkeep_inventory::{
    scanner, InventoryEntry, InventoryError, InventoryStore, SortKey, UninstallStore,
};
use appkeep_pkg::PackageManager;
use kameo::actor::{ActorRef, Spawn};
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::actor::store::StoreActor;
use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::events::{InstallEvent, MatchEvent, RunHandle};
use crate::installer::InstallRun;
use crate::matcher::MatchRun;
use crate::message::{
    FilterEntries, GetSummaries, ReplaceEntries, ResultsReport, SelectEntries, Snapshot,
    SortEntries, Summaries,
};
use crate::session_log::SessionLog;

fn actor_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::ActorError(e.to_string())
}

/// Inventory, matching and install services behind one handle
pub struct Vault {
    store: ActorRef<StoreActor>,
    registry: Arc<dyn UninstallStore>,
    manager: Arc<dyn PackageManager>,
    config: CoreConfig,
    worker: Arc<Mutex<()>>,
}

impl Vault {
    /// Spawn the store actor with an empty inventory
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        registry: Arc<dyn UninstallStore>,
        manager: Arc<dyn PackageManager>,
        config: CoreConfig,
    ) -> Self {
        Self {
            store: StoreActor::spawn(InventoryStore::new()),
            registry,
            manager,
            config,
            worker: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Take the single-worker guard without waiting
    fn acquire(&self) -> Result<OwnedMutexGuard<()>, CoreError> {
        self.worker.clone().try_lock_owned().map_err(|_| CoreError::Busy)
    }

    /// Whether a background operation currently holds the guard
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.worker.try_lock().is_err()
    }

    async fn replace(&self, entries: Vec<InventoryEntry>) -> Result<usize, CoreError> {
        self.store
            .ask(ReplaceEntries { entries })
            .await
            .map_err(actor_error)
    }

    async fn select(&self, indices: Vec<usize>) -> Result<Vec<(usize, InventoryEntry)>, CoreError> {
        let selection = self
            .store
            .ask(SelectEntries { indices })
            .await
            .map_err(actor_error)?;
        match selection.out_of_range {
            Some(index) => Err(InventoryError::IndexOutOfRange(index).into()),
            None => Ok(selection.entries),
        }
    }

    async fn ensure_available(&self) -> Result<(), CoreError> {
        if self.manager.is_available().await {
            Ok(())
        } else {
            Err(CoreError::PackageManagerUnavailable(
                self.manager.manager_type().to_string(),
            ))
        }
    }

    // ------------------------------------------------------------------------
    // Jobs
    // ------------------------------------------------------------------------

    /// Scan the uninstall registry and replace the inventory
    ///
    /// Returns the number of entries found.
    ///
    /// # Errors
    /// Returns `Busy` while another job runs, or an error if the blocking
    /// scan task fails.
    #[instrument(skip(self))]
    pub async fn scan(&self) -> Result<usize, CoreError> {
        let _guard = self.acquire()?;
        let registry = Arc::clone(&self.registry);
        let entries = tokio::task::spawn_blocking(move || scanner::scan(registry.as_ref()))
            .await
            .map_err(|e| CoreError::TaskFailed(e.to_string()))?;
        self.replace(entries).await
    }

    /// Resolve catalog identifiers for the entries at `indices`
    ///
    /// # Errors
    /// Returns `Busy`, `PackageManagerUnavailable`, or an inventory error
    /// for an out-of-range index. Nothing runs in those cases.
    #[instrument(skip(self, indices), fields(count = indices.len()))]
    pub async fn match_packages(&self, indices: &[usize]) -> Result<RunHandle<MatchEvent>, CoreError> {
        let guard = self.acquire()?;
        self.ensure_available().await?;
        let targets = self.select(indices.to_vec()).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let run = MatchRun {
            store: self.store.clone(),
            manager: Arc::clone(&self.manager),
            targets,
            events: tx,
            cancel: cancel.clone(),
            guard,
        };

        tokio::spawn(run.run());

        Ok(RunHandle::new(rx, cancel))
    }

    /// Install the entries at `indices`, one at a time
    ///
    /// # Errors
    /// Returns `Busy`, `PackageManagerUnavailable`, or an inventory error
    /// for an out-of-range index. Nothing runs in those cases.
    #[instrument(skip(self, indices), fields(count = indices.len()))]
    pub async fn install(&self, indices: &[usize]) -> Result<RunHandle<InstallEvent>, CoreError> {
        let guard = self.acquire()?;
        self.ensure_available().await?;
        let targets = self.select(indices.to_vec()).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let log_dir = self.config.session_log.resolve_directory();
        let run = InstallRun {
            store: self.store.clone(),
            manager: Arc::clone(&self.manager),
            targets,
            events: tx,
            cancel: cancel.clone(),
            session_log: SessionLog::open_or_disabled(log_dir.as_deref()),
            guard,
        };

        tokio::spawn(run.run());

        Ok(RunHandle::new(rx, cancel))
    }

    /// Replace the inventory with caller-supplied entries
    ///
    /// # Errors
    /// Returns `Busy` while another job runs.
    pub async fn load(&self, entries: Vec<InventoryEntry>) -> Result<usize, CoreError> {
        let _guard = self.acquire()?;
        self.replace(entries).await
    }

    /// Replace the inventory with the contents of a document
    ///
    /// The store is untouched unless the whole document parses.
    ///
    /// # Errors
    /// Returns `Busy`, or an import error.
    #[instrument(skip(self))]
    pub async fn import_document(&self, path: &Path) -> Result<usize, CoreError> {
        let _guard = self.acquire()?;
        let path = path.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || import_document(&path))
            .await
            .map_err(|e| CoreError::TaskFailed(e.to_string()))??;
        self.replace(entries).await
    }

    /// Reorder the inventory; indices handed out earlier become stale
    ///
    /// # Errors
    /// Returns `Busy` while another job runs.
    pub async fn sort(&self, key: SortKey) -> Result<(), CoreError> {
        let _guard = self.acquire()?;
        self.store
            .ask(SortEntries { key })
            .await
            .map(|_| ())
            .map_err(actor_error)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Clone of the current inventory
    ///
    /// # Errors
    /// Returns an error if the store actor is gone.
    pub async fn snapshot(&self) -> Result<Vec<InventoryEntry>, CoreError> {
        self.store.ask(Snapshot).await.map_err(actor_error)
    }

    /// Indices of entries whose name or publisher contains `query`
    ///
    /// # Errors
    /// Returns an error if the store actor is gone.
    pub async fn filter(&self, query: &str) -> Result<Vec<usize>, CoreError> {
        self.store
            .ask(FilterEntries {
                query: query.to_string(),
            })
            .await
            .map_err(actor_error)
    }

    /// Match and install counts
    ///
    /// # Errors
    /// Returns an error if the store actor is gone.
    pub async fn summaries(&self) -> Result<Summaries, CoreError> {
        self.store.ask(GetSummaries).await.map_err(actor_error)
    }

    /// Plain-text install results report
    ///
    /// # Errors
    /// Returns an error if the store actor is gone.
    pub async fn results_report(&self, generated_at: &str) -> Result<String, CoreError> {
        self.store
            .ask(ResultsReport {
                generated_at: generated_at.to_string(),
            })
            .await
            .map_err(actor_error)
    }

    /// Bare `winget install` lines for the resolved entries at `indices`;
    /// empty `indices` covers everything
    ///
    /// # Errors
    /// Returns an inventory error for an out-of-range index.
    pub async fn install_commands(&self, indices: &[usize]) -> Result<String, CoreError> {
        Ok(install_commands(&self.export_set(indices).await?))
    }

    /// Entries at `indices`, or the whole inventory when empty
    async fn export_set(&self, indices: &[usize]) -> Result<Vec<InventoryEntry>, CoreError> {
        if indices.is_empty() {
            self.snapshot().await
        } else {
            Ok(self
                .select(indices.to_vec())
                .await?
                .into_iter()
                .map(|(_, entry)| entry)
                .collect())
        }
    }

    // ------------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------------

    /// Write the inventory document; empty `indices` exports everything
    ///
    /// # Errors
    /// Returns an export error if the file cannot be written.
    pub async fn export_document(&self, indices: &[usize], path: &Path) -> Result<usize, CoreError> {
        let entries = self.export_set(indices).await?;
        export_document(&entries, path)?;
        Ok(entries.len())
    }

    /// Write the install script; empty `indices` exports everything
    ///
    /// # Errors
    /// Returns an export error if the file cannot be written.
    pub async fn export_script(
        &self,
        indices: &[usize],
        path: &Path,
    ) -> Result<InstallScript, CoreError> {
        let entries = self.export_set(indices).await?;
        Ok(export_script(&entries, path)?)
    }

    /// Write document, script and listing into `dir`
    ///
    /// # Errors
    /// Returns an export error if any file cannot be written.
    pub async fn export_bundle(
        &self,
        indices: &[usize],
        dir: &Path,
    ) -> Result<BTreeMap<String, PathBuf>, CoreError> {
        let entries = self.export_set(indices).await?;
        if entries.is_empty() {
            warn!(dir = %dir.display(), "exporting an empty bundle");
        }
        let written = export_bundle(&entries, dir)?;
        info!(files = written.len(), "bundle written");
        Ok(written)
    }
}
