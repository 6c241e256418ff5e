//! Events emitted by the background workers
//!
//! Each run owns one unbounded channel. The last event of every run is
//! `Completed`, after which the channel closes.

use appkeep_inventory::{InstallOutcome, MatchStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Package matcher events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// An entry was looked up in the catalog
    Matched {
        index: usize,
        status: MatchStatus,
        /// Empty unless `status` is `Found`
        package_id: String,
    },
    /// Items handled so far, including skipped ones
    Progress { processed: usize, total: usize },
    /// Run finished; `cancelled` when it stopped early
    Completed { cancelled: bool },
}

/// Install orchestrator events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    Started { index: usize, name: String },
    Finished { index: usize, outcome: InstallOutcome },
    OverallProgress { done: usize, total: usize },
    /// Human-readable progress line
    LogLine(String),
    Completed { cancelled: bool },
}

impl InstallEvent {
    /// Whether this is the final event of a run
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, InstallEvent::Completed { .. })
    }
}

impl MatchEvent {
    /// Whether this is the final event of a run
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, MatchEvent::Completed { .. })
    }
}

/// Receiving end of a background run
pub struct RunHandle<E> {
    events: mpsc::UnboundedReceiver<E>,
    cancel: CancellationToken,
}

impl<E> RunHandle<E> {
    pub(crate) fn new(events: mpsc::UnboundedReceiver<E>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// Next event, `None` once the run has finished
    pub async fn next(&mut self) -> Option<E> {
        self.events.recv().await
    }

    /// Ask the worker to stop before its next item
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token shared with the worker, e.g. for a Ctrl-C handler
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drain every remaining event
    pub async fn collect(mut self) -> Vec<E> {
        let mut out = Vec::new();
        while let Some(event) = self.events.recv().await {
            out.push(event);
        }
        out
    }
}
