//! PDF artifact downloads.
//!
//! Files are streamed to `<output_root>/<year>/<final URL segment>` in
//! fixed-size chunks. Re-downloading the same URL overwrites the earlier file.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use proceedings_crawler::download::ArtifactDownloader;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = ArtifactDownloader::new("./proceedings", Duration::from_secs(300))?;
//! let url = Url::parse("https://papers.nips.cc/paper_files/paper/2020/file/abc-Paper.pdf")?;
//! let path = downloader.download(&url, 2020).await?;
//! println!("Downloaded: {}", path.display());
//! # Ok(())
//! # }
//! ```

mod downloader;
mod error;
mod filename;

pub use downloader::{ArtifactDownloader, CHUNK_SIZE, DEFAULT_DOWNLOAD_TIMEOUT};
pub use error::DownloadError;
pub use filename::filename_from_url;
