//! CLI entry point for the proceedings crawler.

use anyhow::{Context, Result};
use clap::Parser;
use proceedings_crawler::{CrawlConfig, Crawler, load_file_config};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let mut config = CrawlConfig::default();
    if let Some(file_config) =
        load_file_config(args.config.as_deref()).context("failed to load config file")?
    {
        config
            .merge(&file_config)
            .context("invalid value in config file")?;
    }
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    info!(
        base_url = %config.base_url,
        output_dir = %config.output_dir.display(),
        start_year = config.start_year,
        end_year = config.end_year,
        concurrency = config.concurrency,
        "crawler starting"
    );

    let crawler = Crawler::new(config).context("failed to initialise crawler")?;
    let stats = crawler.run().await.context("crawl failed")?;

    info!(
        years = stats.years_dispatched(),
        papers = stats.papers_processed(),
        papers_failed = stats.papers_failed(),
        pdfs = stats.pdfs_downloaded(),
        pdfs_failed = stats.pdfs_failed(),
        rows = stats.rows_written(),
        "done"
    );

    Ok(())
}
