//! User-facing command layer.
//!
//! # Responsibility
//! - Map load/add/delete/copy intents onto sync operations.
//! - Collapse every outcome into one fixed notification per intent.
//!
//! # Invariants
//! - Error details never reach the notification text.
//! - The entry form is reset only after a confirmed add or on cancel.
//! - Copy of an unknown key never issues a network call.

use crate::model::record::{EntryForm, Record, RecordKey};
use crate::remote::UsersApi;
use crate::repo::mirror_repo::MirrorRepository;
use crate::service::sync_service::{SyncError, SyncService};
use crate::store::record_store::RecordStore;
use log::{info, warn};

const MSG_LOAD_OK: &str = "Пользователи загружены";
const MSG_LOAD_FAILED: &str = "Не удалось получить данные пользователей";
const MSG_ADD_OK: &str = "Пользователь успешно добавлен!";
const MSG_ADD_FAILED: &str = "Ошибка при добавлении пользователя!";
const MSG_DELETE_OK: &str = "Пользователь успешно удален!";
const MSG_DELETE_FAILED: &str = "Ошибка при удалении пользователя!";
const MSG_COPY_OK: &str = "Копия пользователя создана!";
const MSG_COPY_FAILED: &str = "Ошибка при создании копии пользователя!";
const MSG_NOT_FOUND: &str = "Пользователь не найден!";

/// User intent handled by the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Load,
    Add,
    Delete,
    Copy,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Copy => "copy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Message for the notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: &'static str,
}

impl Notification {
    fn success(message: &'static str) -> Self {
        Self {
            level: NotificationLevel::Success,
            message,
        }
    }

    fn error(message: &'static str) -> Self {
        Self {
            level: NotificationLevel::Error,
            message,
        }
    }
}

/// Result envelope of one command.
#[derive(Debug)]
pub struct CommandOutcome {
    pub intent: Intent,
    pub notification: Notification,
    /// Record appended by add/copy. `None` when the server echoed a key the
    /// store already holds.
    pub record: Option<Record>,
    /// Underlying failure, kept for diagnostics only.
    pub error: Option<SyncError>,
}

impl CommandOutcome {
    fn succeeded(intent: Intent, message: &'static str, record: Option<Record>) -> Self {
        Self {
            intent,
            notification: Notification::success(message),
            record,
            error: None,
        }
    }

    fn failed(intent: Intent, message: &'static str, error: SyncError) -> Self {
        warn!(
            "event=command module=command status=error intent={} error={}",
            intent.as_str(),
            error
        );
        Self {
            intent,
            notification: Notification::error(message),
            record: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.notification.level == NotificationLevel::Success
    }
}

/// Command facade over the sync service.
pub struct CommandService<A: UsersApi, M: MirrorRepository> {
    sync: SyncService<A, M>,
}

impl<A: UsersApi, M: MirrorRepository> CommandService<A, M> {
    pub fn new(api: A, store: RecordStore<M>) -> Self {
        Self {
            sync: SyncService::new(api, store),
        }
    }

    /// Current record snapshot, for the table view.
    pub fn records(&self) -> &[Record] {
        self.sync.store().records()
    }

    pub fn store(&self) -> &RecordStore<M> {
        self.sync.store()
    }

    /// Startup sequence: rehydrate from the mirror, then load remotely.
    ///
    /// A failed load keeps the rehydrated records visible.
    pub fn start(&mut self) -> CommandOutcome {
        let cached = self.sync.rehydrate();
        info!(
            "event=command_start module=command status=start cached_records={}",
            cached
        );
        self.load()
    }

    /// Loads the full list from the backend.
    pub fn load(&mut self) -> CommandOutcome {
        match self.sync.fetch_all() {
            Ok(_) => CommandOutcome::succeeded(Intent::Load, MSG_LOAD_OK, None),
            Err(err) => CommandOutcome::failed(Intent::Load, MSG_LOAD_FAILED, err),
        }
    }

    /// Submits the entry form as a new record with a fresh key.
    ///
    /// The form is reset on success and left untouched on failure.
    pub fn add(&mut self, form: &mut EntryForm) -> CommandOutcome {
        let record = form.to_record();
        match self.sync.create(&record) {
            Ok(created) => {
                form.reset();
                CommandOutcome::succeeded(Intent::Add, MSG_ADD_OK, created)
            }
            Err(err) => CommandOutcome::failed(Intent::Add, MSG_ADD_FAILED, err),
        }
    }

    /// Deletes `key` remotely, then locally.
    pub fn delete(&mut self, key: &RecordKey) -> CommandOutcome {
        match self.sync.delete(key) {
            Ok(_) => CommandOutcome::succeeded(Intent::Delete, MSG_DELETE_OK, None),
            Err(err) => CommandOutcome::failed(Intent::Delete, MSG_DELETE_FAILED, err),
        }
    }

    /// Copies the record with `key`.
    pub fn copy(&mut self, key: &RecordKey) -> CommandOutcome {
        match self.sync.duplicate(key) {
            Ok(created) => CommandOutcome::succeeded(Intent::Copy, MSG_COPY_OK, created),
            Err(err @ SyncError::NotFound(_)) => {
                CommandOutcome::failed(Intent::Copy, MSG_NOT_FOUND, err)
            }
            Err(err) => CommandOutcome::failed(Intent::Copy, MSG_COPY_FAILED, err),
        }
    }

    /// Closes the entry flow without submitting.
    pub fn cancel(&self, form: &mut EntryForm) {
        form.reset();
    }
}
