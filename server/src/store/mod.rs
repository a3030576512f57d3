//! SQLite record store.
//!
//! # Design
//! `TodoStore` is an explicitly constructed handle: `main` opens it, hands it
//! to the router, and closes it after the server stops. There is no global
//! connection. The single connection sits behind a mutex, so each store
//! operation runs alone; the store guarantees single-statement atomicity only.
//!
//! # Invariants
//! - A returned store has every migration applied.
//! - `foreign_keys` is on and a busy timeout is set.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use thiserror::Error;
use tracing::{error, info};

pub mod migrations;

pub type StoreResult<T> = Result<T, StoreError>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistence failure. Every variant is reported to API callers as a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },

    /// A persisted row does not describe a valid todo.
    #[error("invalid persisted todo data: {0}")]
    InvalidData(String),

    #[error("store connection lock poisoned")]
    Poisoned,
}

/// Owner of the SQLite connection holding the `todos` table.
#[derive(Debug)]
pub struct TodoStore {
    conn: Mutex<Connection>,
}

impl TodoStore {
    /// Open (creating if missing) a database file and migrate it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        Self::bootstrap("file", || Connection::open(path))
    }

    /// Open a private in-memory database, used by tests and `--in-memory`.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    fn bootstrap(
        mode: &'static str,
        open: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StoreResult<Self> {
        let started_at = Instant::now();
        let result = open()
            .map_err(StoreError::from)
            .and_then(|mut conn| {
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                migrations::apply_migrations(&mut conn)?;
                Ok(conn)
            });

        let elapsed_ms = started_at.elapsed().as_millis();
        match result {
            Ok(conn) => {
                info!(mode, duration_ms = elapsed_ms as u64, "store opened");
                Ok(Self {
                    conn: Mutex::new(conn),
                })
            }
            Err(err) => {
                error!(mode, duration_ms = elapsed_ms as u64, error = %err, "store open failed");
                Err(err)
            }
        }
    }

    /// Close the connection, reporting failures that a plain drop would hide.
    pub fn close(self) -> StoreResult<()> {
        let conn = self.conn.into_inner().map_err(|_| StoreError::Poisoned)?;
        match conn.close() {
            Ok(()) => {
                info!("store closed");
                Ok(())
            }
            Err((_conn, err)) => {
                error!(error = %err, "store close failed");
                Err(err.into())
            }
        }
    }

    /// Run `f` with exclusive access to the connection.
    pub(crate) fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn schema_version(&self) -> StoreResult<u32> {
        let conn = self.lock()?;
        migrations::current_version(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_is_migrated() {
        let store = TodoStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), migrations::latest_version());
        store.close().unwrap();
    }

    #[test]
    fn open_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");
        let store = TodoStore::open(&path).unwrap();
        assert!(path.exists());
        store.close().unwrap();
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("todos.db");
        let err = TodoStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
