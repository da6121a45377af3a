//! HTML extraction: anchor matching, target discovery and paper metadata.
//!
//! Everything here is synchronous and works on a borrowed page body; parsed
//! documents never outlive a single call, so the async crawler never holds one
//! across an `.await`.

mod links;
mod metadata;

use thiserror::Error;

pub use links::{
    Link, LinkMatcher, discover_papers, discover_years, extract_year, select_links,
};
pub use metadata::{
    DEFAULT_ABSTRACT_SELECTOR, DEFAULT_AUTHOR_SELECTOR, DEFAULT_PDF_SUFFIX,
    DEFAULT_TITLE_SELECTOR, MetadataExtractor, PaperMetadata, PdfLink, SelectorConfig,
    StructuralExtractor,
};

/// Errors raised while configuring extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A CSS selector string did not parse.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// The selector as given.
        selector: String,
        /// Parser message.
        reason: String,
    },
}
