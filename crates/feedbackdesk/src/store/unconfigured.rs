//! Stand-in store used when the hosted backend isn't configured.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::record::{FeedbackRecord, NewFeedback};

use super::RecordStore;

/// Store that lists nothing and refuses every mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredStore;

#[async_trait]
impl RecordStore for UnconfiguredStore {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>> {
        Err(Error::BackendUnconfigured)
    }

    async fn create(&self, _new: &NewFeedback) -> Result<FeedbackRecord> {
        Err(Error::BackendUnconfigured)
    }

    async fn delete_one(&self, _id: &str) -> Result<()> {
        Err(Error::BackendUnconfigured)
    }

    async fn delete_all(&self) -> Result<()> {
        Err(Error::BackendUnconfigured)
    }
}
