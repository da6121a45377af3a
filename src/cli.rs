//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use proceedings_crawler::CrawlConfig;

/// Crawl conference proceedings into a CSV file and per-year PDF folders.
///
/// Values not given on the command line come from the config file, then from
/// built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "proceedings-crawler")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory for the CSV file and PDFs
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Site root to crawl
    #[arg(long)]
    pub base_url: Option<Url>,

    /// First year to crawl (inclusive)
    #[arg(long)]
    pub start_year: Option<u16>,

    /// Last year to crawl (inclusive)
    #[arg(long)]
    pub end_year: Option<u16>,

    /// Maximum concurrent page fetches and downloads (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Attempts per page, including the first (1-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_attempts: Option<u8>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Per-page request timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout_secs: Option<u64>,

    /// Fixed sleep before every request in milliseconds (0 to disable)
    #[arg(long)]
    pub request_delay_ms: Option<u64>,
}

impl Args {
    /// Default log filter for the verbosity flags; `RUST_LOG` overrides it.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Overlays every flag that was given onto `config`.
    pub fn apply_overrides(&self, config: &mut CrawlConfig) {
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(start_year) = self.start_year {
            config.start_year = start_year;
        }
        if let Some(end_year) = self.end_year {
            config.end_year = end_year;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = usize::from(concurrency);
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = u32::from(max_attempts);
        }
        if let Some(ms) = self.retry_delay_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.request_delay_ms {
            config.request_delay = Duration::from_millis(ms);
        }
    }
}
