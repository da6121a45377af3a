//! Run counters shared by every crawl task.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Statistics from a crawl run.
///
/// Workers update the counters concurrently; [`CrawlStats::snapshot`] copies
/// them out once the run has finished.
#[derive(Debug, Default)]
pub struct CrawlStats {
    years_dispatched: AtomicUsize,
    years_failed: AtomicUsize,
    papers_dispatched: AtomicUsize,
    papers_processed: AtomicUsize,
    papers_failed: AtomicUsize,
    pdfs_downloaded: AtomicUsize,
    pdfs_failed: AtomicUsize,
    pdfs_missing: AtomicUsize,
    tasks_panicked: AtomicUsize,
    rows_written: AtomicUsize,
}

impl CrawlStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Year listing pages queued for fetching.
    #[must_use]
    pub fn years_dispatched(&self) -> usize {
        self.years_dispatched.load(Ordering::SeqCst)
    }

    /// Year listing pages that could not be fetched.
    #[must_use]
    pub fn years_failed(&self) -> usize {
        self.years_failed.load(Ordering::SeqCst)
    }

    /// Paper detail pages queued for fetching.
    #[must_use]
    pub fn papers_dispatched(&self) -> usize {
        self.papers_dispatched.load(Ordering::SeqCst)
    }

    /// Paper pages fetched and turned into a row.
    #[must_use]
    pub fn papers_processed(&self) -> usize {
        self.papers_processed.load(Ordering::SeqCst)
    }

    /// Paper pages dropped after fetch or submission failure.
    #[must_use]
    pub fn papers_failed(&self) -> usize {
        self.papers_failed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn pdfs_downloaded(&self) -> usize {
        self.pdfs_downloaded.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn pdfs_failed(&self) -> usize {
        self.pdfs_failed.load(Ordering::SeqCst)
    }

    /// Papers whose detail page had no usable PDF link.
    #[must_use]
    pub fn pdfs_missing(&self) -> usize {
        self.pdfs_missing.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn tasks_panicked(&self) -> usize {
        self.tasks_panicked.load(Ordering::SeqCst)
    }

    /// Rows the result writer reported as written.
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written.load(Ordering::SeqCst)
    }

    /// Copies the current counter values into a new, unshared tracker.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        let copy = |counter: &AtomicUsize| AtomicUsize::new(counter.load(Ordering::SeqCst));
        Self {
            years_dispatched: copy(&self.years_dispatched),
            years_failed: copy(&self.years_failed),
            papers_dispatched: copy(&self.papers_dispatched),
            papers_processed: copy(&self.papers_processed),
            papers_failed: copy(&self.papers_failed),
            pdfs_downloaded: copy(&self.pdfs_downloaded),
            pdfs_failed: copy(&self.pdfs_failed),
            pdfs_missing: copy(&self.pdfs_missing),
            tasks_panicked: copy(&self.tasks_panicked),
            rows_written: copy(&self.rows_written),
        }
    }

    pub(crate) fn add_years_dispatched(&self, count: usize) {
        self.years_dispatched.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn increment_years_failed(&self) {
        self.years_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_papers_dispatched(&self, count: usize) {
        self.papers_dispatched.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn increment_papers_processed(&self) {
        self.papers_processed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_papers_failed(&self) {
        self.papers_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_pdfs_downloaded(&self) {
        self.pdfs_downloaded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_pdfs_failed(&self) {
        self.pdfs_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_pdfs_missing(&self) {
        self.pdfs_missing.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_tasks_panicked(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn set_rows_written(&self, rows: usize) {
        self.rows_written.store(rows, Ordering::SeqCst);
    }
}
