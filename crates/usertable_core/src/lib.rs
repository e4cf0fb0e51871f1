//! Client-side state synchronization for the user table.
//! Owns the record store, its local mirror and the remote users API calls.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging};
pub use model::record::{EntryForm, Record, RecordFields, RecordKey};
pub use remote::{HttpUsersApi, RemoteError, RemoteOperation, RemoteResult, UsersApi};
pub use repo::mirror_repo::{
    MirrorError, MirrorRepository, MirrorResult, SqliteMirrorRepository, USERS_SLOT,
};
pub use service::command_service::{
    CommandOutcome, CommandService, Intent, Notification, NotificationLevel,
};
pub use service::sync_service::{SyncError, SyncResult, SyncService};
pub use store::record_store::RecordStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
