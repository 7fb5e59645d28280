//! Bizline Storage Layer
//!
//! Implements the LogStore trait using SQLite.
//!
//! # Architecture
//!
//! - `request_log`: one row per submitted text, written before classification
//!   and completed once with the outcome
//! - `feedback_log`: one immutable row per feedback submission
//!
//! # Examples
//!
//! ```no_run
//! use bizline_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for log operations
//! ```

#![warn(missing_docs)]

use bizline_domain::traits::LogStore;
use bizline_domain::{
    AccountCount, AccountId, FeedbackLogEntry, LogSummary, NewFeedback, NewRequestLog,
    RequestCompletion, RequestLogEntry,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Log entry not found
    #[error("Log entry not found: {0}")]
    NotFound(i64),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const IN_MEMORY: &str = ":memory:";

/// SQLite-based implementation of LogStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between request
/// handlers behind a mutex.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bizline_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("logs.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let path = (path.as_os_str() != IN_MEMORY).then(|| path.to_path_buf());

        let mut store = Self { conn, path };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Path of the database file, `None` for an in-memory store
    pub fn database_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn row_to_request(row: &Row<'_>) -> rusqlite::Result<RequestLogEntry> {
        Ok(RequestLogEntry {
            id: row.get(0)?,
            account: AccountId::new(row.get::<_, String>(1)?),
            model_name: row.get(2)?,
            input_text: row.get(3)?,
            predicted_label: row.get(4)?,
            processing_time: row.get(5)?,
            error_message: row.get(6)?,
            created_at: row.get::<_, i64>(7)? as u64,
        })
    }

    fn row_to_feedback(row: &Row<'_>) -> rusqlite::Result<FeedbackLogEntry> {
        Ok(FeedbackLogEntry {
            id: row.get(0)?,
            request_id: row.get(1)?,
            account: AccountId::new(row.get::<_, String>(2)?),
            is_supported: row.get(3)?,
            corrected_label: row.get(4)?,
            created_at: row.get::<_, i64>(5)? as u64,
        })
    }

    fn count_by_account(&self, table: &str) -> Result<Vec<AccountCount>, StoreError> {
        let sql = format!(
            "SELECT account_id, COUNT(id) FROM {} GROUP BY account_id ORDER BY account_id",
            table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let counts = stmt
            .query_map([], |row| {
                Ok(AccountCount {
                    account: AccountId::new(row.get::<_, String>(0)?),
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn count_all(&self, table: &str) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(id) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl LogStore for SqliteStore {
    type Error = StoreError;

    fn record_request(&mut self, entry: NewRequestLog) -> Result<i64, Self::Error> {
        if entry.account.as_str().is_empty() {
            return Err(StoreError::InvalidData("account id cannot be empty".to_string()));
        }

        self.conn.execute(
            "INSERT INTO request_log (account_id, model_name, input_text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.account.as_str(),
                entry.model.as_str(),
                &entry.input_text,
                entry.created_at as i64,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, account = %entry.account, "Recorded request log entry");
        Ok(id)
    }

    fn complete_request(&mut self, id: i64, completion: RequestCompletion) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE request_log
             SET predicted_label = ?1, processing_time = ?2, error_message = ?3
             WHERE id = ?4",
            params![
                completion.predicted_label,
                completion.processing_time,
                completion.error_message,
                id,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn get_request(&self, id: i64) -> Result<Option<RequestLogEntry>, Self::Error> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, account_id, model_name, input_text, predicted_label,
                        processing_time, error_message, created_at
                 FROM request_log WHERE id = ?1",
                params![id],
                Self::row_to_request,
            )
            .optional()?;

        Ok(entry)
    }

    fn record_feedback(&mut self, feedback: NewFeedback) -> Result<i64, Self::Error> {
        self.conn.execute(
            "INSERT INTO feedback_log (request_id, account_id, is_supported, corrected_label, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                feedback.request_id,
                feedback.account.as_str(),
                feedback.is_supported,
                feedback.corrected_label.map(|label| label.name()),
                feedback.created_at as i64,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, request_id = feedback.request_id, "Recorded feedback log entry");
        Ok(id)
    }

    fn get_feedback(&self, request_id: i64) -> Result<Vec<FeedbackLogEntry>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, request_id, account_id, is_supported, corrected_label, created_at
             FROM feedback_log WHERE request_id = ?1 ORDER BY id",
        )?;

        let entries = stmt
            .query_map(params![request_id], Self::row_to_feedback)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn summarize(&self) -> Result<LogSummary, Self::Error> {
        Ok(LogSummary {
            total_requests: self.count_all("request_log")?,
            total_feedback: self.count_all("feedback_log")?,
            requests_by_account: self.count_by_account("request_log")?,
            feedback_by_account: self.count_by_account("feedback_log")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_has_no_path() {
        let store = SqliteStore::new(":memory:").unwrap();
        assert!(store.database_path().is_none());
    }

    #[test]
    fn test_empty_summary() {
        let store = SqliteStore::new(":memory:").unwrap();
        let summary = store.summarize().unwrap();
        assert_eq!(summary, LogSummary::default());
    }
}
