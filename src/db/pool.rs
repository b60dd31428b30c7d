//! SQLite connection wrapper (lightweight for CLI usage).

use crate::db::initialize::init_db;
use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    /// Open the database file and make sure the schema is current.
    pub fn new(path: &str) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::prepare(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> AppResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// Start the write transaction that serializes all changes to one series.
    ///
    /// `BEGIN IMMEDIATE` takes the SQLite write lock up front, so two edits of
    /// the same series can never interleave their reconcile-and-apply steps.
    /// Losing the race is reported as `ConcurrentModification`.
    pub fn begin_series_write(&mut self, series_id: i64) -> AppResult<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| map_busy(e, series_id))
    }

    /// Plain deferred transaction, used by append-only writers.
    pub fn begin(&mut self) -> AppResult<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

/// Map lock contention to the retryable engine error, pass everything else through.
pub fn map_busy(err: rusqlite::Error, series_id: i64) -> AppError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            AppError::ConcurrentModification {
                series_id,
                detail: "another writer holds the lock".into(),
            }
        }
        _ => AppError::Db(err),
    }
}
