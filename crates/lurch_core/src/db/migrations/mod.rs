//! Schema steps for the key-value store database.
//!
//! # Invariants
//! - Step `n` (1-based) of `KV_STORE_SCHEMA` upgrades the schema to version
//!   `n`; the reached version is stored in `PRAGMA user_version`.
//! - Pending steps run in one transaction.
//! - A database newer than the last step is refused untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const KV_STORE_SCHEMA: &[&str] = &[include_str!("0001_kv_store.sql")];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    KV_STORE_SCHEMA.len() as u32
}

/// Version recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings the kv-store schema up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending = &KV_STORE_SCHEMA[current as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in (current + 1..).zip(pending) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", step)?;
    }
    tx.commit()?;
    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current, latest
    );
    Ok(())
}
