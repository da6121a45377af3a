//! Proceedings Crawler Library
//!
//! Crawls a conference-proceedings site: the homepage lists one link per
//! year, each year lists its papers, and each paper page carries the title,
//! authors, abstract and a PDF link. Every processed paper becomes one CSV
//! row, and its PDF lands in a per-year directory.
//!
//! # Architecture
//!
//! - [`fetch`] - HTTP page fetcher with bounded retries
//! - [`extract`] - Year/paper link discovery and metadata extraction
//! - [`download`] - Streaming PDF downloads
//! - [`output`] - CSV result file and its single-writer task
//! - [`crawl`] - Orchestration over a bounded worker pool
//! - [`config`] - Defaults, TOML config file and validation

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crawl;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod output;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, CrawlConfig, FileConfig, load_file_config};
pub use crawl::{CrawlError, CrawlStats, Crawler, Job};
pub use download::{ArtifactDownloader, DownloadError};
pub use extract::{MetadataExtractor, PaperMetadata, PdfLink, StructuralExtractor};
pub use fetch::{FetchError, PageFetcher, RetryPolicy, Unavailable};
pub use model::{NOT_AVAILABLE, PaperRecord, PaperTarget, YearTarget};
pub use output::{RecordSink, ResultWriter, WriteError};
pub use user_agent::default_user_agent;
