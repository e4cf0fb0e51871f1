use usertable_core::db::migrations::{apply_migrations, latest_version};
use usertable_core::db::{open_db_in_memory, DbError};

#[test]
fn open_applies_latest_version_and_slot_table() {
    let conn = open_db_in_memory().unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_slots'
            );",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1);
}

#[test]
fn reapplying_migrations_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}
