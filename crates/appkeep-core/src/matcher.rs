//! Package matcher worker
//!
//! Resolves selected entries to catalog identifiers one at a time. Entries
//! already `Found` are counted but not queried again.

use std::sync::Arc;

use appkeep_inventory::{InventoryEntry, MatchState};
use appkeep_pkg::PackageManager;
use kameo::actor::ActorRef;
use tokio::sync::{mpsc, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::actor::store::StoreActor;
use crate::events::MatchEvent;
use crate::message::ApplyMatch;

/// Everything one match run needs
pub(crate) struct MatchRun {
    pub store: ActorRef<StoreActor>,
    pub manager: Arc<dyn PackageManager>,
    pub targets: Vec<(usize, InventoryEntry)>,
    pub events: mpsc::UnboundedSender<MatchEvent>,
    pub cancel: CancellationToken,
    /// Single-worker guard, held until just before `Completed`
    pub guard: OwnedMutexGuard<()>,
}

impl MatchRun {
    async fn lookup(&self, entry: &InventoryEntry) -> MatchState {
        match self.manager.find_package(&entry.name).await {
            Ok(found) => MatchState::from_lookup(found.as_ref().map(|m| m.id.as_str())),
            Err(e) => {
                warn!(name = %entry.name, error = %e, "catalog lookup failed");
                MatchState::NotFound
            }
        }
    }

    /// Process every target, then emit `Completed`
    pub async fn run(self) {
        let total = self.targets.len();
        let mut processed = 0;
        let mut cancelled = false;

        info!(total, "match run starting");

        for (index, entry) in &self.targets {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            if !entry.match_state.is_found() {
                let state = self.lookup(entry).await;
                let event = MatchEvent::Matched {
                    index: *index,
                    status: state.status(),
                    package_id: state.package_id().unwrap_or_default().to_string(),
                };

                if let Err(e) = self.store.ask(ApplyMatch { index: *index, state }).await {
                    error!(index, error = %e, "could not record match result");
                }
                let _ = self.events.send(event);
            }

            processed += 1;
            let _ = self.events.send(MatchEvent::Progress { processed, total });
        }

        info!(processed, total, cancelled, "match run finished");
        drop(self.guard);
        let _ = self.events.send(MatchEvent::Completed { cancelled });
    }
}
