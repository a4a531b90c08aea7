//! Record store clients.
//!
//! A store is a thin client over a table of feature requests. Every call is a
//! single round trip: no retries, no batching, no local cache, no
//! transactions. Concurrent writers race with last-write-wins semantics.

pub mod rest;
pub mod row;
pub mod schema;
pub mod sqlite;
pub mod unconfigured;

use async_trait::async_trait;
use tracing::error;

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::record::{FeedbackRecord, NewFeedback};

pub use rest::RestStore;
pub use sqlite::SqliteStore;
pub use unconfigured::UnconfiguredStore;

/// Operations every record backend provides.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Short backend name for logging and status output.
    fn name(&self) -> &'static str;

    /// Fetch every record, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers with a
    /// failure.
    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>>;

    /// Every record, newest first.
    ///
    /// Failures are logged and reported as an empty list, so callers cannot
    /// tell "no records" from "fetch failed". Use [`RecordStore::fetch_all`]
    /// when the difference matters.
    async fn list_all(&self) -> Vec<FeedbackRecord> {
        match self.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                error!(backend = self.name(), "Error fetching requests: {}", e);
                Vec::new()
            }
        }
    }

    /// Insert a record; the store assigns its id and creation time.
    ///
    /// Required fields are not checked here, see [`NewFeedback::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    async fn create(&self, new: &NewFeedback) -> Result<FeedbackRecord>;

    /// Delete the record with the given id.
    ///
    /// Deleting an id that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete_one(&self, id: &str) -> Result<()>;

    /// Delete every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete_all(&self) -> Result<()>;
}

/// Build the store selected by the configuration.
///
/// A REST backend with missing url or key yields an [`UnconfiguredStore`]
/// rather than an error; the caller is expected to warn about it.
///
/// # Errors
///
/// Returns an error if the HTTP client or the local database cannot be set up.
pub fn open_store(config: &Config) -> Result<Box<dyn RecordStore>> {
    match config.backend.kind {
        BackendKind::Sqlite => Ok(Box::new(SqliteStore::open(config.database_path())?)),
        BackendKind::Rest => match (&config.backend.url, &config.backend.anon_key) {
            (Some(url), Some(key)) if config.missing_backend_settings().is_empty() => Ok(
                Box::new(RestStore::new(url, key, &config.backend.table)?),
            ),
            _ => Ok(Box::new(UnconfiguredStore)),
        },
    }
}
