//! Work-queue driver for year and paper jobs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::{CrawlError, CrawlStats};
use crate::config::CrawlConfig;
use crate::download::ArtifactDownloader;
use crate::extract::{
    LinkMatcher, MetadataExtractor, PdfLink, StructuralExtractor, discover_papers, discover_years,
};
use crate::fetch::{PageFetcher, RetryPolicy, build_client};
use crate::model::{PaperTarget, YearTarget};
use crate::output::{DEFAULT_CHANNEL_CAPACITY, RecordSender, RecordSink, ResultWriter};

/// A unit of work for the shared pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Fetch a year listing and queue its papers.
    Year(YearTarget),
    /// Fetch a paper page, write its row and download its PDF.
    Paper(PaperTarget),
}

/// Crawls a proceedings site into a CSV file and per-year PDF directories.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: PageFetcher,
    downloader: ArtifactDownloader,
    extractor: Arc<dyn MetadataExtractor>,
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .field("downloader", &self.downloader)
            .finish_non_exhaustive()
    }
}

/// State shared by every in-flight job.
struct JobContext {
    fetcher: PageFetcher,
    downloader: ArtifactDownloader,
    extractor: Arc<dyn MetadataExtractor>,
    paper_links: LinkMatcher,
    base_url: Url,
    request_delay: Duration,
    records: RecordSender,
    stats: Arc<CrawlStats>,
}

impl Crawler {
    /// Validates `config` and builds the HTTP clients and default extractor.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Config`] for invalid settings,
    /// [`CrawlError::Extract`] for an unparsable selector, or
    /// [`CrawlError::Client`] if an HTTP client cannot be built.
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        config.validate()?;

        let policy = RetryPolicy::new(config.max_attempts, config.retry_delay)
            .with_retry_permanent_failures(config.retry_permanent_failures);
        let fetcher =
            PageFetcher::with_user_agent(config.request_timeout, policy, &config.user_agent)?;
        let downloader = ArtifactDownloader::with_client(
            build_client(config.download_timeout, &config.user_agent)?,
            config.output_dir.clone(),
        );
        let extractor = Arc::new(StructuralExtractor::with_selectors(&config.selectors)?);

        Ok(Self {
            config,
            fetcher,
            downloader,
            extractor,
        })
    }

    /// Replaces the metadata extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Runs the crawl to completion.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::HomepageUnavailable`] if the homepage cannot be
    /// fetched, or [`CrawlError::Output`] if the result file cannot be
    /// created or a row cannot be written. Individual year, paper and
    /// download failures do NOT cause this method to error.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn run(&self) -> Result<CrawlStats, CrawlError> {
        let writer = ResultWriter::open(self.config.csv_path())?;
        let (records, sink) = RecordSink::spawn(writer, DEFAULT_CHANNEL_CAPACITY);
        let stats = Arc::new(CrawlStats::new());

        let ctx = Arc::new(JobContext {
            fetcher: self.fetcher.clone(),
            downloader: self.downloader.clone(),
            extractor: Arc::clone(&self.extractor),
            paper_links: self.config.paper_links.clone(),
            base_url: self.config.base_url.clone(),
            request_delay: self.config.request_delay,
            records,
            stats: Arc::clone(&stats),
        });

        let years = match self.discover_years(&ctx).await {
            Ok(years) => years,
            Err(e) => {
                drop(ctx);
                // The writer has nothing queued; its result adds nothing here.
                let _ = sink.finish().await;
                return Err(e);
            }
        };
        stats.add_years_dispatched(years.len());

        let mut pending: VecDeque<Job> = years.into_iter().map(Job::Year).collect();
        drive(&ctx, &mut pending, self.config.concurrency).await;

        drop(ctx);
        let rows = sink.finish().await?;
        stats.set_rows_written(rows);

        info!(
            years = stats.years_dispatched(),
            years_failed = stats.years_failed(),
            papers = stats.papers_processed(),
            papers_failed = stats.papers_failed(),
            pdfs = stats.pdfs_downloaded(),
            pdfs_failed = stats.pdfs_failed(),
            pdfs_missing = stats.pdfs_missing(),
            rows,
            "crawl complete"
        );

        Ok(stats.snapshot())
    }

    async fn discover_years(&self, ctx: &JobContext) -> Result<Vec<YearTarget>, CrawlError> {
        ctx.pause().await;
        let homepage = ctx
            .fetcher
            .fetch(self.config.base_url.as_str())
            .await
            .map_err(CrawlError::HomepageUnavailable)?;

        let range = self.config.year_range();
        let years = discover_years(
            &homepage,
            &self.config.base_url,
            &self.config.year_links,
            &range,
        );
        if years.is_empty() {
            warn!(
                start_year = range.start(),
                end_year = range.end(),
                "no year links found in range"
            );
        } else {
            info!(count = years.len(), "discovered year listings");
        }
        Ok(years)
    }
}

/// Keeps up to `slots` jobs running until the queue and the pool are empty.
async fn drive(ctx: &Arc<JobContext>, pending: &mut VecDeque<Job>, slots: usize) {
    let mut tasks: JoinSet<Vec<Job>> = JoinSet::new();

    loop {
        while tasks.len() < slots {
            let Some(job) = pending.pop_front() else {
                break;
            };
            tasks.spawn(run_job(Arc::clone(ctx), job));
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };
        match joined {
            Ok(follow_ups) => pending.extend(follow_ups),
            Err(e) => {
                warn!(error = %e, "crawl task panicked");
                ctx.stats.increment_tasks_panicked();
            }
        }
    }
}

async fn run_job(ctx: Arc<JobContext>, job: Job) -> Vec<Job> {
    match job {
        Job::Year(target) => ctx.process_year(target).await,
        Job::Paper(target) => {
            ctx.process_paper(target).await;
            Vec::new()
        }
    }
}

impl JobContext {
    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    #[instrument(skip(self, target), fields(year = target.year, url = %target.listing_url))]
    async fn process_year(&self, target: YearTarget) -> Vec<Job> {
        self.pause().await;
        let listing = match self.fetcher.fetch(target.listing_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "dropping year");
                self.stats.increment_years_failed();
                return Vec::new();
            }
        };

        let papers = discover_papers(&listing, &self.base_url, &self.paper_links, target.year);
        info!(count = papers.len(), "discovered papers");
        self.stats.add_papers_dispatched(papers.len());
        papers.into_iter().map(Job::Paper).collect()
    }

    #[instrument(skip(self, target), fields(year = target.year, url = %target.detail_url))]
    async fn process_paper(&self, target: PaperTarget) {
        self.pause().await;
        let page = match self.fetcher.fetch(target.detail_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "dropping paper");
                self.stats.increment_papers_failed();
                return;
            }
        };

        let metadata = self.extractor.extract(&page, &self.base_url);
        let record = metadata.to_record(target.year);
        debug!(title = %record.title, "extracted metadata");

        if let Err(e) = self.records.send(record).await {
            error!(error = %e, "row not written");
            self.stats.increment_papers_failed();
            return;
        }
        self.stats.increment_papers_processed();

        match metadata.pdf {
            PdfLink::Resolved(url) => {
                self.pause().await;
                match self.downloader.download(&url, target.year).await {
                    Ok(_) => self.stats.increment_pdfs_downloaded(),
                    Err(e) => {
                        warn!(pdf = %url, error = %e, "PDF download failed");
                        self.stats.increment_pdfs_failed();
                    }
                }
            }
            PdfLink::Absent => {
                debug!("no PDF link on page");
                self.stats.increment_pdfs_missing();
            }
            PdfLink::Unresolvable { href } => {
                warn!(href = %href, "PDF link cannot be resolved");
                self.stats.increment_pdfs_missing();
            }
        }
    }
}

