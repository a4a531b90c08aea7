//! The request desk: a record store behind the admin mode switch.
//!
//! Submission and listing are open to everyone. Deleting and clearing go
//! through [`AccessGate::require_mutation`] first.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::Result;
use crate::export;
use crate::gate::AccessGate;
use crate::record::{FeedbackRecord, NewFeedback};
use crate::store::RecordStore;

/// A record store plus the admin mode switch that guards it.
#[derive(Debug)]
pub struct Desk {
    store: Box<dyn RecordStore>,
    gate: AccessGate,
}

impl Desk {
    /// Put `store` behind `gate`.
    #[must_use]
    pub fn new(store: Box<dyn RecordStore>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    /// The access gate.
    #[must_use]
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// The access gate, for logging in and out.
    pub fn gate_mut(&mut self) -> &mut AccessGate {
        &mut self.gate
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Validate and submit a request.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is sent, or the store's
    /// error if the insert fails.
    pub async fn submit(&self, new: &NewFeedback) -> Result<FeedbackRecord> {
        new.validate()?;
        self.store.create(new).await
    }

    /// All records, newest first. Empty on fetch failure.
    pub async fn records(&self) -> Vec<FeedbackRecord> {
        self.store.list_all().await
    }

    /// All records, newest first, or why they could not be fetched.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the fetch fails.
    pub async fn try_records(&self) -> Result<Vec<FeedbackRecord>> {
        self.store.fetch_all().await
    }

    /// Look up one record by id among the listed records.
    pub async fn find(&self, id: &str) -> Option<FeedbackRecord> {
        self.records().await.into_iter().find(|r| r.id == id)
    }

    /// Delete one record. Requires admin mode.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotPermitted`] in read-only mode, or the
    /// store's error if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.gate.require_mutation()?;
        debug!("Deleting request {}", id);
        self.store.delete_one(id).await
    }

    /// Delete every record. Requires admin mode.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotPermitted`] in read-only mode, or the
    /// store's error if the delete fails.
    pub async fn clear(&self) -> Result<()> {
        self.gate.require_mutation()?;
        debug!("Clearing all requests");
        self.store.delete_all().await
    }

    /// Export every record, newest first, to a spreadsheet in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NothingToExport`] when there are no records, or
    /// an error if the file cannot be written.
    pub async fn export(&self, dir: &Path, now: &DateTime<Local>) -> Result<PathBuf> {
        let records = self.records().await;
        export::export_to_dir(&records, dir, now)
    }
}
