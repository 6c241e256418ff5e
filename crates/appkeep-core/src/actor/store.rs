//! `StoreActor`: sole owner of the inventory store
//!
//! Every read is a cloned snapshot and every write is one message, so the
//! workers and the driver never alias the live record set.

use appkeep_inventory::{InventoryEntry, InventoryError, InventoryStore};
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::message::{
    ApplyInstall, ApplyMatch, FilterEntries, GetSummaries, ReplaceEntries, ResultsReport,
    SelectEntries, Selection, Snapshot, SortEntries, Summaries,
};

/// Actor wrapping an [`InventoryStore`]
pub struct StoreActor {
    store: InventoryStore,
}

impl Actor for StoreActor {
    type Args = InventoryStore;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(id = %actor_ref.id(), entries = args.len(), "StoreActor starting");
        Ok(Self { store: args })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(reason = ?reason, "StoreActor stopping");
        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<Snapshot> for StoreActor {
    type Reply = Vec<InventoryEntry>;

    async fn handle(&mut self, _msg: Snapshot, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.store.entries().to_vec()
    }
}

impl Message<ReplaceEntries> for StoreActor {
    type Reply = usize;

    async fn handle(
        &mut self,
        msg: ReplaceEntries,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.store.replace(msg.entries);
        info!(entries = self.store.len(), "inventory replaced");
        self.store.len()
    }
}

impl Message<SelectEntries> for StoreActor {
    type Reply = Selection;

    async fn handle(
        &mut self,
        msg: SelectEntries,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        match self.store.select(&msg.indices) {
            Ok(entries) => Selection {
                entries,
                out_of_range: None,
            },
            Err(InventoryError::IndexOutOfRange(index)) => Selection {
                entries: Vec::new(),
                out_of_range: Some(index),
            },
            // select only reports out-of-range indices
            Err(_) => Selection {
                entries: Vec::new(),
                out_of_range: msg.indices.first().copied(),
            },
        }
    }
}

impl Message<ApplyMatch> for StoreActor {
    type Reply = Result<(), InventoryError>;

    async fn handle(&mut self, msg: ApplyMatch, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        debug!(index = msg.index, status = %msg.state.status(), "match applied");
        self.store.set_match(msg.index, msg.state)
    }
}

impl Message<ApplyInstall> for StoreActor {
    type Reply = Result<(), InventoryError>;

    async fn handle(
        &mut self,
        msg: ApplyInstall,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        debug!(index = msg.index, status = %msg.state.status(), "install state applied");
        self.store.set_install(msg.index, msg.state)
    }
}

impl Message<FilterEntries> for StoreActor {
    type Reply = Vec<usize>;

    async fn handle(
        &mut self,
        msg: FilterEntries,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.store.filter(&msg.query)
    }
}

impl Message<SortEntries> for StoreActor {
    type Reply = usize;

    async fn handle(&mut self, msg: SortEntries, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.store.sort_by(msg.key);
        self.store.len()
    }
}

impl Message<GetSummaries> for StoreActor {
    type Reply = Summaries;

    async fn handle(
        &mut self,
        _msg: GetSummaries,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        Summaries {
            matched: self.store.match_summary(),
            installed: self.store.install_summary(),
        }
    }
}

impl Message<ResultsReport> for StoreActor {
    type Reply = String;

    async fn handle(
        &mut self,
        msg: ResultsReport,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.store.results_report(&msg.generated_at)
    }
}

#[cfg(test)]
mod tests {
    use appkeep_inventory::{InstallOutcome, InstallState, MatchState, SourceHive};
    use kameo::actor::Spawn;

    use super::*;

    fn store() -> InventoryStore {
        InventoryStore::from_entries(vec![
            InventoryEntry::new("Zoom", SourceHive::Hkcu),
            InventoryEntry::new("git", SourceHive::Hklm64),
            InventoryEntry::new("Git", SourceHive::Hklm32),
        ])
    }

    #[tokio::test]
    async fn test_snapshot_is_deduplicated_and_sorted() {
        let actor = StoreActor::spawn(store());

        let entries = actor.ask(Snapshot).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["git", "Zoom"]);
    }

    #[tokio::test]
    async fn test_updates_touch_one_field_group() {
        let actor = StoreActor::spawn(store());

        actor
            .ask(ApplyMatch {
                index: 0,
                state: MatchState::Found("Git.Git".to_string()),
            })
            .await
            .unwrap();
        actor
            .ask(ApplyInstall {
                index: 0,
                state: InstallState::Done(InstallOutcome::Success),
            })
            .await
            .unwrap();

        let entries = actor.ask(Snapshot).await.unwrap();
        assert_eq!(entries[0].package_id(), Some("Git.Git"));
        assert_eq!(entries[0].install_state, InstallState::Done(InstallOutcome::Success));
        assert_eq!(entries[1].match_state, MatchState::Unknown);

        let summaries = actor.ask(GetSummaries).await.unwrap();
        assert_eq!(summaries.matched.found, 1);
        assert_eq!(summaries.installed.succeeded, 1);
    }

    #[tokio::test]
    async fn test_select_reports_bad_index() {
        let actor = StoreActor::spawn(store());

        let selection = actor.ask(SelectEntries { indices: vec![1, 0] }).await.unwrap();
        assert_eq!(selection.out_of_range, None);
        assert_eq!(selection.entries[0].0, 1);
        assert_eq!(selection.entries[0].1.name, "Zoom");

        let selection = actor.ask(SelectEntries { indices: vec![0, 7] }).await.unwrap();
        assert_eq!(selection.out_of_range, Some(7));
        assert!(selection.entries.is_empty());

        assert!(actor
            .ask(ApplyMatch {
                index: 9,
                state: MatchState::NotFound,
            })
            .await
            .is_err());
    }
}
