//! SQLite-backed key-value store.
//!
//! # Invariants
//! - Writes are single-statement upserts, atomic per key.
//! - The `kv_store` table exists before the store is constructed.
//! - The schema version lives in `PRAGMA user_version`; a file written by a
//!   newer schema is refused rather than read.
//! - File-backed connections use WAL journaling so a crashed write never
//!   leaves a half-written value behind.

use super::{KeyValueStore, StoreError, StoreResult};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// `user_version` written by this build once `kv_store` exists.
pub const KV_SCHEMA_VERSION: u32 = 1;

const KV_STORE_DDL: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-value store persisted in the `kv_store` table.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) a store file and prepares its schema.
    ///
    /// # Side effects
    /// - Creates the file when missing.
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        open_with("file", || Connection::open(path))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        open_with("memory", Connection::open_in_memory)
    }

    /// Wraps a caller-owned connection, creating `kv_store` when missing.
    ///
    /// # Errors
    /// - `UnsupportedSchemaVersion` when the connection carries a newer schema.
    pub fn from_connection(mut conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        prepare_schema(&mut conn)?;
        Ok(Self { conn })
    }
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<SqliteKeyValueStore> {
    let started_at = Instant::now();
    info!("event=db_open module=store status=start mode={mode}");

    let result = open()
        .map_err(|err| ("db_open_failed", StoreError::from(err)))
        .and_then(|mut conn| {
            bootstrap(&mut conn, mode)
                .map(|()| conn)
                .map_err(|err| ("db_bootstrap_failed", err))
        });

    match result {
        Ok(conn) => {
            info!(
                "event=db_open module=store status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(SqliteKeyValueStore { conn })
        }
        Err((code, err)) => {
            error!(
                "event=db_open module=store status=error mode={} duration_ms={} error_code={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                code,
                err
            );
            Err(err)
        }
    }
}

fn bootstrap(conn: &mut Connection, mode: &str) -> StoreResult<()> {
    if mode == "file" {
        // journal_mode returns a row, so it cannot go through execute_batch.
        let _: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    }
    conn.busy_timeout(BUSY_TIMEOUT)?;
    prepare_schema(conn)
}

fn prepare_schema(conn: &mut Connection) -> StoreResult<()> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if db_version > KV_SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version,
            supported: KV_SCHEMA_VERSION,
        });
    }
    if db_version == KV_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(KV_STORE_DDL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {KV_SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=db_migrate module=store status=ok from_version={} to_version={}",
        db_version, KV_SCHEMA_VERSION
    );
    Ok(())
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        debug!(
            "event=kv_set module=store status=ok bytes={}",
            value.len()
        );
        Ok(())
    }
}
