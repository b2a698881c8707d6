//! Authenticated HTTP client for the roster report endpoint.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::report::{ReportDocument, ReportEntry};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Error fetching or decoding the roster report. Every variant is fatal for
/// the run: reconciliation never starts from a partial roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("roster fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("roster endpoint returned status {status}")]
    Status { status: u16 },

    #[error("roster document could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Fetches the report document with basic-auth credentials.
pub struct RosterClient {
    http: reqwest::Client,
    uri: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for RosterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterClient")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RosterClient {
    pub fn new(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, RosterError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RosterError::Client)?;
        Ok(Self {
            http,
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
        })
    }

    /// Fetches and decodes the report. The caller enforces the minimum-count
    /// precondition; this only guarantees a well-formed document.
    pub async fn fetch(&self) -> Result<Vec<ReportEntry>, RosterError> {
        debug!(uri = %self.uri, "fetching roster report");

        let response = self
            .http
            .get(&self.uri)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Status {
                status: status.as_u16(),
            });
        }

        let document: ReportDocument = response.json().await.map_err(RosterError::Decode)?;
        info!(count = document.entries.len(), "roster report fetched");
        Ok(document.entries)
    }
}
