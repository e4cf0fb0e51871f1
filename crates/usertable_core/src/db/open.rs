//! Connection bootstrap for the mirror database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the mirror database file, creating it when missing.
///
/// # Side effects
/// - Creates missing parent directories.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            // Let Connection::open report the failure with a SQLite error.
            warn!(
                "event=db_open module=db status=warn mode=file error_code=mkdir_failed error={}",
                err
            );
        }
    }
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory mirror database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode);

    let mut conn = open().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        err
    })?;

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
