use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::matcher::TermMatcher;
use crate::errors::CountResult;

const DEFAULT_USER_AGENT: &str = concat!("tallyscout/", env!("CARGO_PKG_VERSION"));

/// Counts the term in HTTP response bodies.
///
/// The response status is not checked: whatever body the server sends back is
/// counted. A timeout covers the whole request, body included.
#[derive(Debug, Clone)]
pub struct HttpCounter {
    client: Client,
    matcher: TermMatcher,
}

impl HttpCounter {
    /// Creates a counter whose requests give up after `timeout`
    pub fn new(matcher: TermMatcher, timeout: Duration) -> CountResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self { client, matcher })
    }

    /// Fetches `url` and counts the term in the full body.
    ///
    /// Returns the count and the body length in bytes.
    pub async fn count(&self, url: &Url) -> CountResult<(usize, u64)> {
        trace!(url = %url, "HTTP GET request starting");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            debug!(
                url = %url,
                error = %e,
                is_timeout = e.is_timeout(),
                is_connect = e.is_connect(),
                "HTTP request failed"
            );
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Counting body of non-success response");
        }

        let body = response.bytes().await?;
        trace!(url = %url, bytes = body.len(), "HTTP response body read");

        Ok((self.matcher.count(&body), body.len() as u64))
    }
}
