//! Streams PDF artifacts into year-partitioned directories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use super::filename::filename_from_url;
use crate::fetch::build_client;
use crate::user_agent;

/// Size of each write to disk while streaming a response body.
pub const CHUNK_SIZE: usize = 8192;

/// Default whole-request timeout for PDF downloads (5 minutes for large files).
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Downloads PDFs to `<output_root>/<year>/<filename>`.
///
/// An existing file with the same name is overwritten. Downloads are never
/// retried; a failure affects only the one artifact.
#[derive(Debug, Clone)]
pub struct ArtifactDownloader {
    client: Client,
    output_root: PathBuf,
}

impl ArtifactDownloader {
    /// Creates a downloader writing under `output_root`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialised.
    pub fn new(output_root: impl Into<PathBuf>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = build_client(timeout, &user_agent::default_user_agent())?;
        Ok(Self::with_client(client, output_root))
    }

    /// Creates a downloader reusing an existing client.
    #[must_use]
    pub fn with_client(client: Client, output_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_root: output_root.into(),
        }
    }

    /// Returns the directory downloads are partitioned under.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Returns the directory a given year's PDFs land in.
    #[must_use]
    pub fn year_dir(&self, year: u16) -> PathBuf {
        self.output_root.join(year.to_string())
    }

    /// Downloads `url` into the year's directory and returns the written path.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] if no filename can be derived, the directory or
    /// file cannot be written, the request fails, or the server answers with a
    /// non-success status. A partially written file is removed.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download(&self, url: &Url, year: u16) -> Result<PathBuf, DownloadError> {
        let filename = filename_from_url(url).ok_or_else(|| DownloadError::NoFilename {
            url: url.to_string(),
        })?;

        let dir = self.year_dir(year);
        // create_dir_all tolerates concurrent creation of the same path.
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DownloadError::io(dir.clone(), e))?;
        let file_path = dir.join(&filename);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }

        // File::create truncates, so a second download replaces the first.
        let file = File::create(&file_path)
            .await
            .map_err(|e| DownloadError::io(file_path.clone(), e))?;

        let stream_result = stream_to_file(file, response, url, &file_path).await;
        if stream_result.is_err() {
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&file_path).await;
        }
        let bytes = stream_result?;

        info!(path = %file_path.display(), bytes, "downloaded");
        Ok(file_path)
    }
}

/// Streams the response body to `file` in [`CHUNK_SIZE`] writes, returning bytes written.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &Url,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url.as_str(), e))?;

        for piece in chunk.chunks(CHUNK_SIZE) {
            writer
                .write_all(piece)
                .await
                .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;
        }
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
