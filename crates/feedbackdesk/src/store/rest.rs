//! Hosted backend client.
//!
//! Talks to a PostgREST endpoint (for example a Supabase project's
//! `/rest/v1`). The anon key is sent both as `apikey` and as a bearer token.
//! No request timeout is set: a hung call hangs the command that issued it.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{FeedbackRecord, NewFeedback};

use super::row::{rows_to_records, FeedbackRow, InsertRow, SENTINEL_ID};
use super::RecordStore;

/// Record store backed by a PostgREST table.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    /// `{base}/rest/v1/{table}`
    endpoint: String,
    anon_key: String,
}

impl RestStore {
    /// Create a client for `table` under the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, anon_key: &str, table: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        let endpoint = format!("{}/rest/v1/{table}", base_url.trim_end_matches('/'));
        debug!("Using REST endpoint {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            anon_key: anon_key.to_string(),
        })
    }

    /// The table endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Turn a non-success response into [`Error::Backend`].
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::backend(status.as_u16(), body))
    }
}

#[async_trait]
impl RecordStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let rows: Vec<FeedbackRow> = Self::check(response).await?.json().await?;
        debug!("Fetched {} rows", rows.len());
        Ok(rows_to_records(rows))
    }

    async fn create(&self, new: &NewFeedback) -> Result<FeedbackRecord> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[InsertRow::from(new)])
            .send()
            .await?;
        let rows: Vec<FeedbackRow> = Self::check(response).await?.json().await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::malformed_row("insert returned no row"))?;
        let record = FeedbackRecord::try_from(row)?;
        info!("Created request {}", record.id);
        Ok(record)
    }

    async fn delete_one(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(response).await?;
        info!("Deleted request {}", id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let response = self
            .request(Method::DELETE)
            .query(&[("id", format!("neq.{SENTINEL_ID}"))])
            .send()
            .await?;
        Self::check(response).await?;
        info!("Cleared all requests");
        Ok(())
    }
}
