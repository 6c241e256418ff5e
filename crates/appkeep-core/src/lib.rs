//! appkeep-core: store actor, background workers and the `Vault` facade
//!
//! The inventory store lives in a kameo actor. Matching and installing run
//! as background tasks that update the store by message and report to the
//! driver over a per-run event channel.

pub mod actor;
pub mod config;
pub mod error;
pub mod events;
mod installer;
mod matcher;
pub mod message;
pub mod session_log;
pub mod vault;

pub use actor::StoreActor;
pub use config::{CoreConfig, SessionLogConfig};
pub use error::CoreError;
pub use events::{InstallEvent, MatchEvent, RunHandle};
pub use message::Summaries;
pub use session_log::SessionLog;
pub use vault::Vault;
