//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading a PDF artifact.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create dir, create file, write).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The URL has no final path segment to name the file after.
    #[error("cannot derive a filename from {url}")]
    NoFilename {
        /// The offending URL.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
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

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let error = DownloadError::http_status("https://example.com/file.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://example.com/file.pdf"));
    }

    #[test]
    fn test_io_display_contains_path() {
        let error = DownloadError::io(
            "/tmp/2020/x.pdf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = error.to_string();
        assert!(msg.contains("/tmp/2020/x.pdf"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_no_filename_display() {
        let error = DownloadError::NoFilename {
            url: "https://example.com/".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "cannot derive a filename from https://example.com/"
        );
    }
}
