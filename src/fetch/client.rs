//! HTTP page fetcher with bounded, fixed-delay retries.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{FetchError, Unavailable};
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::user_agent;

/// Fetches HTML pages, retrying failed attempts according to a [`RetryPolicy`].
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl PageFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        Self::with_user_agent(timeout, policy, &user_agent::default_user_agent())
    }

    /// Creates a fetcher with an explicit User-Agent header.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialised.
    pub fn with_user_agent(
        timeout: Duration,
        policy: RetryPolicy,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = build_client(timeout, user_agent)?;
        Ok(Self { client, policy })
    }

    /// Returns the retry policy in use.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the underlying reqwest client, for sharing with the PDF downloader.
    #[must_use]
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Fetches `url` and returns its body as text.
    ///
    /// Each failed attempt is logged at `warn`. Between attempts the fetcher
    /// sleeps the policy's fixed delay; no delay follows the final attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] once the retry budget is exhausted (or, when the
    /// policy skips permanent failures, on the first permanent failure).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<String, Unavailable> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.fetch_once(url).await {
                Ok(body) => {
                    debug!(attempt, bytes = body.len(), "page fetched");
                    return Ok(body);
                }
                Err(error) => {
                    let failure_type = classify_error(&error);
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        ?failure_type,
                        error = %error,
                        "fetch attempt failed"
                    );

                    match self.policy.should_retry(failure_type, attempt) {
                        RetryDecision::Retry { delay, .. } => {
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(url = %url, %reason, "not retrying fetch");
                            return Err(Unavailable {
                                url: url.to_string(),
                                attempts: attempt,
                                last: error,
                            });
                        }
                    }
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        response.text().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source,
                }
            }
        })
    }
}

/// Builds the shared reqwest client used for pages and PDFs.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent)
        .gzip(true)
        .build()
}
