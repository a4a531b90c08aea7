//! Local `SQLite` backend.
//!
//! Same table layout as the hosted backend, with the "server side" work
//! (UUID ids, creation timestamps) done here instead.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::record::{FeedbackRecord, NewFeedback};

use super::row::{rows_to_records, FeedbackRow, InsertRow, SENTINEL_ID};
use super::schema;
use super::RecordStore;

const SELECT_COLUMNS: &str = r"
SELECT id, department, contact_name, contact_phone, contact_email,
       problem_description, requirements, priority, expected_completion,
       additional_notes, created_at
FROM feedback_requests
";

/// Record store backed by a local `SQLite` file.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }

    fn get(conn: &Connection, id: &str) -> Result<Option<FeedbackRow>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = conn.query_row(&sql, [id], Self::read_row).optional()?;
        Ok(row)
    }

    fn read_row(row: &rusqlite::Row) -> rusqlite::Result<FeedbackRow> {
        Ok(FeedbackRow {
            id: row.get(0)?,
            department: row.get(1)?,
            contact_name: row.get(2)?,
            contact_phone: row.get(3)?,
            contact_email: row.get(4)?,
            problem_description: row.get(5)?,
            requirements: row.get(6)?,
            priority: row.get(7)?,
            expected_completion: row.get(8)?,
            additional_notes: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>> {
        let conn = self.conn()?;
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, seq DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows_to_records(rows))
    }

    async fn create(&self, new: &NewFeedback) -> Result<FeedbackRecord> {
        let conn = self.conn()?;
        let row = InsertRow::from(new);
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        conn.execute(
            r"
            INSERT INTO feedback_requests (
                id, department, contact_name, contact_phone, contact_email,
                problem_description, requirements, priority, expected_completion,
                additional_notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
            params![
                id,
                row.department,
                row.contact_name,
                row.contact_phone,
                row.contact_email,
                row.problem_description,
                row.requirements,
                row.priority,
                row.expected_completion,
                row.additional_notes,
                created_at,
            ],
        )?;

        let stored = Self::get(&conn, &id)?
            .ok_or_else(|| Error::internal(format!("inserted row {id} not found")))?;
        info!("Created request {}", id);
        FeedbackRecord::try_from(stored)
    }

    async fn delete_one(&self, id: &str) -> Result<()> {
        let affected = self
            .conn()?
            .execute("DELETE FROM feedback_requests WHERE id = ?1", [id])?;
        debug!("Deleted {} row(s) for id {}", affected, id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let affected = self
            .conn()?
            .execute("DELETE FROM feedback_requests WHERE id != ?1", [SENTINEL_ID])?;
        info!("Cleared {} requests", affected);
        Ok(())
    }
}
