//! Page fetching with a fixed-delay retry budget.
//!
//! Every page the crawler reads (homepage, year listings, paper detail pages)
//! goes through [`PageFetcher`]. A fetch either yields the response body or an
//! [`Unavailable`] value once the retry budget is spent; transport errors never
//! escape this module as anything else.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use proceedings_crawler::fetch::{PageFetcher, RetryPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = PageFetcher::new(Duration::from_secs(20), RetryPolicy::default())?;
//! match fetcher.fetch("https://papers.nips.cc").await {
//!     Ok(body) => println!("{} bytes", body.len()),
//!     Err(unavailable) => eprintln!("{unavailable}"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod retry;

pub(crate) use client::build_client;
pub use client::PageFetcher;
pub use error::{FetchError, Unavailable};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, FailureType, RetryDecision, RetryPolicy,
    classify_error,
};
