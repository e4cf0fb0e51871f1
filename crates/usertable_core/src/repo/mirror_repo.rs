//! Persistence mirror contracts and SQLite slot implementation.
//!
//! # Responsibility
//! - Serialize the full record list into one named key-value slot.
//! - Rehydrate the record list from that slot at startup.
//!
//! # Invariants
//! - The slot value is the JSON array form of the record list.
//! - A missing slot means "nothing cached yet", not an error.

use crate::db::DbError;
use crate::model::record::Record;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed slot name holding the cached user list.
pub const USERS_SLOT: &str = "users";

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Mirror read/write failure.
#[derive(Debug)]
pub enum MirrorError {
    Db(DbError),
    Serde(serde_json::Error),
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "invalid mirrored records: {err}"),
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serde(err) => Some(err),
        }
    }
}

impl From<DbError> for MirrorError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for MirrorError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Durable write-through cache for the record list.
pub trait MirrorRepository {
    fn save_snapshot(&self, records: &[Record]) -> MirrorResult<()>;
    fn load_snapshot(&self) -> MirrorResult<Option<Vec<Record>>>;
    fn clear_snapshot(&self) -> MirrorResult<()>;
}

/// SQLite-backed mirror writing into the `kv_slots` table.
pub struct SqliteMirrorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMirrorRepository<'conn> {
    /// Creates a mirror bound to the `users` slot.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MirrorRepository for SqliteMirrorRepository<'_> {
    fn save_snapshot(&self, records: &[Record]) -> MirrorResult<()> {
        let payload = serde_json::to_string(records)?;
        self.conn.execute(
            "INSERT INTO kv_slots (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![USERS_SLOT, payload],
        )?;
        Ok(())
    }

    fn load_snapshot(&self) -> MirrorResult<Option<Vec<Record>>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE name = ?1;",
                [USERS_SLOT],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn clear_snapshot(&self) -> MirrorResult<()> {
        self.conn
            .execute("DELETE FROM kv_slots WHERE name = ?1;", [USERS_SLOT])?;
        Ok(())
    }
}

impl<M: MirrorRepository + ?Sized> MirrorRepository for &M {
    fn save_snapshot(&self, records: &[Record]) -> MirrorResult<()> {
        (**self).save_snapshot(records)
    }

    fn load_snapshot(&self) -> MirrorResult<Option<Vec<Record>>> {
        (**self).load_snapshot()
    }

    fn clear_snapshot(&self) -> MirrorResult<()> {
        (**self).clear_snapshot()
    }
}
