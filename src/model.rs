//! Crawl targets and the output record.

use std::fmt;

use url::Url;

/// Placeholder written to the CSV for fields that could not be found.
pub const NOT_AVAILABLE: &str = "N/A";

/// One proceedings year to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTarget {
    /// Conference year.
    pub year: u16,
    /// Absolute URL of the year's listing page.
    pub listing_url: Url,
}

/// One paper detail page to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperTarget {
    /// Absolute URL of the paper's detail page.
    pub detail_url: Url,
    /// Year the paper was listed under.
    pub year: u16,
}

/// A fully rendered output row.
///
/// All fields are final strings; absent values have already been replaced by
/// [`NOT_AVAILABLE`] (or an empty string for authors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub year: u16,
    pub title: String,
    pub authors: String,
    pub abstract_text: String,
    pub pdf_url: String,
}

impl PaperRecord {
    /// Column names, in output order.
    pub const HEADER: [&'static str; 5] = ["Year", "Title", "Authors", "Abstract", "PDF Link"];

    /// Returns the row's fields in [`HEADER`](Self::HEADER) order.
    #[must_use]
    pub fn fields(&self) -> [String; 5] {
        [
            self.year.to_string(),
            self.title.clone(),
            self.authors.clone(),
            self.abstract_text.clone(),
            self.pdf_url.clone(),
        ]
    }
}

impl fmt::Display for YearTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.year, self.listing_url)
    }
}
