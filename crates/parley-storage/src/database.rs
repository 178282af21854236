// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: `Database` wraps one `tokio_rusqlite::Connection`, every query
//! function accepts `&Database` and calls through `connection().call()`, and
//! each multi-statement operation runs inside one transaction on that thread.
//! Do NOT create additional Connection instances for writes.

use std::time::Duration;

use parley_config::StorageConfig;
use parley_core::ParleyError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Handle to the single serialized SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the configured path, apply PRAGMAs,
    /// and run all pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, ParleyError> {
        let conn = Connection::open(&config.database_path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        let wal_mode = config.wal_mode;
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
            }
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<(), ParleyError> {
            crate::migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| ParleyError::Storage {
            source: Box::new(e),
        })?;

        debug!(path = %config.database_path, wal = wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying serialized connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so pending pages reach the main database file. The
    /// writer thread shuts down when the handle is dropped.
    pub async fn close(self) -> Result<(), ParleyError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

/// Wrap a tokio-rusqlite error as an opaque storage error.
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error) -> ParleyError {
    ParleyError::Storage {
        source: Box::new(err),
    }
}

/// True when the error is a UNIQUE (or primary key) constraint violation,
/// which the caller may surface as a domain conflict instead of a generic
/// storage failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
