//! Remote sync operations over the record store.
//!
//! # Responsibility
//! - Issue fetch-all, create, delete and duplicate calls to the backend.
//! - Apply confirmed results to the record store (confirm-then-apply).
//!
//! # Invariants
//! - The store is never mutated before the remote call succeeds.
//! - A failed call leaves no trace in the store or the mirror.
//! - Delete always reaches the network; duplicate checks locally first.
//! - Failures are logged once here and never retried.

use crate::model::record::{Record, RecordKey};
use crate::remote::{RemoteError, UsersApi};
use crate::repo::mirror_repo::MirrorRepository;
use crate::store::record_store::RecordStore;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of one sync operation.
#[derive(Debug)]
pub enum SyncError {
    /// The backend call failed.
    Remote(RemoteError),
    /// Target key is not present in the local store.
    NotFound(RecordKey),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "record not found: {key}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Owns the record store and keeps it in step with the backend.
pub struct SyncService<A: UsersApi, M: MirrorRepository> {
    api: A,
    store: RecordStore<M>,
}

impl<A: UsersApi, M: MirrorRepository> SyncService<A, M> {
    /// Wraps `store`; nothing is fetched until [`Self::fetch_all`].
    pub fn new(api: A, store: RecordStore<M>) -> Self {
        Self { api, store }
    }

    /// Read access to the confirmed local state.
    pub fn store(&self) -> &RecordStore<M> {
        &self.store
    }

    /// Seeds the store from the local mirror. See [`RecordStore::rehydrate`].
    pub fn rehydrate(&mut self) -> usize {
        self.store.rehydrate()
    }

    /// Fetches the full list and replaces the store contents.
    pub fn fetch_all(&mut self) -> SyncResult<usize> {
        let records = self
            .api
            .fetch_all()
            .map_err(|err| log_failure("fetch_all", None, err))?;
        let count = records.len();
        self.store.replace_all(records);
        info!(
            "event=sync_fetch_all module=sync status=ok records={}",
            count
        );
        Ok(count)
    }

    /// Creates `record` remotely and appends the server's version.
    ///
    /// Returns `None` when the server echoed a key already in the store; the
    /// remote create still succeeded but nothing is appended locally.
    pub fn create(&mut self, record: &Record) -> SyncResult<Option<Record>> {
        let created = self
            .api
            .create(record)
            .map_err(|err| log_failure("create", Some(record.key()), err))?;
        let key = created.key().clone();
        if !self.store.append(created.clone()) {
            warn!(
                "event=sync_create module=sync status=skipped reason=duplicate_key key={}",
                key
            );
            return Ok(None);
        }
        info!("event=sync_create module=sync status=ok key={}", key);
        Ok(Some(created))
    }

    /// Deletes `key` remotely, then removes it locally.
    ///
    /// Returns the removed local record, or `None` when the key was not in
    /// the store (the remote delete is still issued).
    pub fn delete(&mut self, key: &RecordKey) -> SyncResult<Option<Record>> {
        self.api
            .delete(key)
            .map_err(|err| log_failure("delete", Some(key), err))?;
        let removed = self.store.remove_by_key(key);
        info!(
            "event=sync_delete module=sync status=ok key={} local_hit={}",
            key,
            removed.is_some()
        );
        Ok(removed)
    }

    /// Copies the record with `key` under a fresh key and creates it remotely.
    ///
    /// # Errors
    /// - `NotFound` without any network call when `key` is not in the store.
    pub fn duplicate(&mut self, key: &RecordKey) -> SyncResult<Option<Record>> {
        let Some(copy) = self.store.fresh_copy(key) else {
            return Err(SyncError::NotFound(key.clone()));
        };
        self.create(&copy)
    }
}

fn log_failure(operation: &str, key: Option<&RecordKey>, err: RemoteError) -> SyncError {
    match key {
        Some(key) => error!(
            "event=sync_{} module=sync status=error key={} error={}",
            operation, key, err
        ),
        None => error!(
            "event=sync_{} module=sync status=error error={}",
            operation, err
        ),
    }
    SyncError::Remote(err)
}
