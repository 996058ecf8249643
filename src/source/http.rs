//! HTTP data source.
//!
//! Polls a REST endpoint (or a published spreadsheet export) that returns
//! the row document as JSON.

use std::time::Duration;

use handwatch_types::Batch;
use reqwest::blocking::Client;

use super::rows::{document_rows, Sequencer};
use super::{DataSource, FetchError};

/// Default request timeout. A hung endpoint must not stall the poll loop.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A data source that fetches sensor rows over HTTP.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use handwatch::{DataSource, HttpSource};
///
/// let mut source = HttpSource::builder()
///     .url("http://192.168.1.40/readings")
///     .timeout(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// let batch = source.fetch();
/// ```
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    url: String,
    description: String,
    sequencer: Sequencer,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// The endpoint being polled.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DataSource for HttpSource {
    fn fetch(&mut self) -> Result<Batch, FetchError> {
        let response = self.client.get(&self.url).send()?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let document: serde_json::Value = response.json()?;
        let rows = document_rows(document)?;
        Ok(self.sequencer.sequence(&rows))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the endpoint URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let url = self
            .url
            .ok_or_else(|| FetchError::Connection("no URL configured".to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(HttpSource {
            client,
            description: format!("http: {}", url),
            url,
            sequencer: Sequencer::new(),
        })
    }
}
