//! HTTP implementation of [`PageSource`] over the catalogue REST API.
//!
//! One request shape only:
//!
//! ```text
//! GET {base_url}/{collection}?offset=O&limit=L
//! -> {"count": N, "next": url|null, "previous": url|null, "results": [{"name", "url"}]}
//! ```

use std::fmt;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::types::{PageEnvelope, RawItem};

use super::{PageSource, RetryPolicy, TransportError, execute_with_retry};

/// Wire format of a list response.
#[derive(Debug, Deserialize)]
struct ListResponse {
    count: usize,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<RawItem>,
}

impl From<ListResponse> for PageEnvelope {
    fn from(response: ListResponse) -> Self {
        PageEnvelope {
            total_count: response.count,
            has_next_cursor: response.next.is_some(),
            has_previous_cursor: response.previous.is_some(),
            items: response.results,
        }
    }
}

/// Read-only client for a paged collection endpoint.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let endpoint = config.collection_url()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            client,
            endpoint,
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The collection endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn page_url(&self, offset: usize, limit: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    async fn fetch_once(&self, url: &Url) -> std::result::Result<PageEnvelope, TransportError> {
        tracing::debug!(%url, "requesting page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                TransportError::with_status(format!("HTTP {}", status), status)
                    .with_url(url.as_str()),
            );
        }

        let body: ListResponse = response.json().await.map_err(|e| {
            TransportError::decode(format!("unexpected response body: {e}")).with_url(url.as_str())
        })?;

        Ok(body.into())
    }
}

impl PageSource for RemoteClient {
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> std::result::Result<PageEnvelope, TransportError> {
        let url = self.page_url(offset, limit);
        execute_with_retry(self.retry, || self.fetch_once(&url)).await
    }
}
