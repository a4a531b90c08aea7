//! `SQLite` schema for the local backend.
//!
//! Mirrors the hosted table's columns (see [`super::row`]). `seq` is local
//! bookkeeping only: it breaks ties between rows created within the same
//! microsecond so that newest-first ordering stays total.

use rusqlite::Connection;

use crate::error::Result;

/// SQL statement to create the records table.
pub const CREATE_FEEDBACK_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS feedback_requests (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    department TEXT NOT NULL,
    contact_name TEXT NOT NULL,
    contact_phone TEXT,
    contact_email TEXT,
    problem_description TEXT NOT NULL,
    requirements TEXT NOT NULL,
    priority TEXT NOT NULL DEFAULT 'medium'
        CHECK (priority IN ('low', 'medium', 'high')),
    expected_completion TEXT,
    additional_notes TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_at` for newest-first listing.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_feedback_created_at ON feedback_requests(created_at DESC)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_FEEDBACK_TABLE, CREATE_CREATED_AT_INDEX];

/// Create the table and indexes if they don't exist.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
