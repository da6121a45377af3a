//! Error types for page fetching.

use thiserror::Error;

/// A single failed fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request did not complete within the configured timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body could not be read or decoded as text.
    #[error("failed reading body of {url}: {source}")]
    Body {
        /// The URL whose body failed.
        url: String,
        /// The underlying decode/read error.
        #[source]
        source: reqwest::Error,
    },

    /// The provided URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

/// A page that could not be fetched within the retry budget.
///
/// This is the only failure a caller of [`PageFetcher::fetch`](super::PageFetcher::fetch)
/// ever sees; the last attempt's error is kept as the source.
#[derive(Debug, Error)]
#[error("{url} unavailable after {attempts} attempt(s)")]
pub struct Unavailable {
    /// The URL that was requested.
    pub url: String,
    /// How many attempts were made.
    pub attempts: u32,
    /// The error from the final attempt.
    #[source]
    pub last: FetchError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let error = FetchError::http_status("https://papers.nips.cc/x", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://papers.nips.cc/x"));
    }

    #[test]
    fn test_unavailable_display_and_source() {
        use std::error::Error as _;

        let unavailable = Unavailable {
            url: "https://papers.nips.cc".to_string(),
            attempts: 3,
            last: FetchError::Timeout {
                url: "https://papers.nips.cc".to_string(),
            },
        };
        assert_eq!(
            unavailable.to_string(),
            "https://papers.nips.cc unavailable after 3 attempt(s)"
        );
        let source = unavailable.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("timeout fetching https://papers.nips.cc"));
    }

    #[test]
    fn test_invalid_url_display() {
        let error = FetchError::invalid_url("not a url");
        assert_eq!(error.to_string(), "invalid URL: not a url");
    }
}
