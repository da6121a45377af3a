//! Crawl orchestration.
//!
//! A run fetches the homepage, discovers year listings inside the configured
//! range, then works through a single queue of year and paper jobs with at
//! most `concurrency` jobs in flight. A finished year job contributes its
//! paper jobs back to the queue; a finished paper job has submitted its CSV
//! row and attempted its PDF download.
//!
//! Only a homepage failure (or an unusable output file) ends the run with an
//! error. Year, paper and download failures are logged and counted in
//! [`CrawlStats`].

mod crawler;
mod stats;

use thiserror::Error;

pub use crawler::{Crawler, Job};
pub use stats::CrawlStats;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::fetch::Unavailable;
use crate::output::WriteError;

/// Errors that end a crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A configured selector is invalid.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The homepage could not be fetched; nothing can be discovered.
    #[error("homepage unavailable: {0}")]
    HomepageUnavailable(#[source] Unavailable),

    /// The result file could not be created or written.
    #[error(transparent)]
    Output(#[from] WriteError),
}
