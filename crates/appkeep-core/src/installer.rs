//! Install orchestrator worker
//!
//! Installs selected entries strictly one after another. A running install
//! is never interrupted: cancellation takes effect before the next entry.

use std::sync::Arc;

use appkeep_inventory::{InstallOutcome, InstallState, InventoryEntry};
use appkeep_pkg::{PackageError, PackageManager};
use chrono::Local;
use kameo::actor::ActorRef;
use tokio::sync::{mpsc, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::actor::store::StoreActor;
use crate::events::InstallEvent;
use crate::message::ApplyInstall;
use crate::session_log::SessionLog;

fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Everything one install run needs
pub(crate) struct InstallRun {
    pub store: ActorRef<StoreActor>,
    pub manager: Arc<dyn PackageManager>,
    pub targets: Vec<(usize, InventoryEntry)>,
    pub events: mpsc::UnboundedSender<InstallEvent>,
    pub cancel: CancellationToken,
    /// Single-worker guard, held until just before `Completed`
    pub guard: OwnedMutexGuard<()>,
    pub session_log: SessionLog,
}

impl InstallRun {
    async fn record(&self, index: usize, state: InstallState) {
        if let Err(e) = self.store.ask(ApplyInstall { index, state }).await {
            error!(index, error = %e, "could not record install state");
        }
    }

    fn log_line(&mut self, text: String) {
        self.session_log.info(&text);
        let _ = self.events.send(InstallEvent::LogLine(text));
    }

    /// Invoke the installer for one resolved entry
    async fn install_one(&mut self, entry: &InventoryEntry, package_id: &str) -> InstallOutcome {
        self.log_line(format!("[{}] Installing: {} ({package_id})", clock(), entry.name));

        match self.manager.install(package_id).await {
            Ok(()) => {
                self.log_line(format!("[{}] Success: {}", clock(), entry.name));
                InstallOutcome::Success
            }
            Err(e) => {
                let message = e.to_string();
                match &e {
                    PackageError::InstallTimeout(_) => {
                        self.log_line(format!("[{}] Timeout: {}", clock(), entry.name));
                    }
                    PackageError::InstallNonZeroExit { status, .. } => {
                        self.session_log.error(&format!(
                            "FAILED: {} | code={status} | {message}",
                            entry.name
                        ));
                        self.log_line(format!("[{}] Failed: {}: {message}", clock(), entry.name));
                    }
                    _ => {
                        self.log_line(format!("[{}] Failed: {}: {message}", clock(), entry.name));
                    }
                }
                warn!(name = %entry.name, id = %package_id, error = %message, "install failed");
                InstallOutcome::Failed(message)
            }
        }
    }

    /// Process every target, then emit `Completed`
    pub async fn run(mut self) {
        let targets = std::mem::take(&mut self.targets);
        let total = targets.len();
        let mut done = 0;
        let mut cancelled = false;

        info!(total, log = ?self.session_log.path(), "install run starting");
        self.session_log
            .info(&format!("=== appkeep install session, {total} app(s) ==="));

        for (index, entry) in &targets {
            let index = *index;
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            self.record(index, InstallState::Installing).await;
            self.session_log.info(&format!("STARTED: {}", entry.name));
            let _ = self.events.send(InstallEvent::Started {
                index,
                name: entry.name.clone(),
            });

            let outcome = match entry.package_id() {
                Some(id) => self.install_one(entry, id).await,
                None => InstallOutcome::Manual,
            };

            self.record(index, InstallState::Done(outcome.clone())).await;
            match &outcome {
                InstallOutcome::Failed(message) => {
                    self.session_log
                        .error(&format!("FINISHED: {} | failed | {message}", entry.name));
                }
                other => {
                    self.session_log.info(&format!(
                        "FINISHED: {} | {} | {}",
                        entry.name,
                        other.status(),
                        other.message()
                    ));
                }
            }
            let _ = self.events.send(InstallEvent::Finished { index, outcome });

            done += 1;
            let _ = self.events.send(InstallEvent::OverallProgress { done, total });
        }

        if cancelled {
            self.session_log
                .info(&format!("=== session cancelled after {done} of {total} ==="));
        } else {
            self.session_log.info("=== session finished ===");
        }
        info!(done, total, cancelled, "install run finished");
        drop(self.guard);
        let _ = self.events.send(InstallEvent::Completed { cancelled });
    }
}
