//! Paper metadata extraction from detail pages.
//!
//! Extraction is a strategy behind the [`MetadataExtractor`] trait so that a
//! change in a site's markup stays contained in one implementation. The
//! provided [`StructuralExtractor`] reads fixed structural positions:
//!
//! | Field    | Source (default selector)                     | When missing |
//! |----------|-----------------------------------------------|--------------|
//! | title    | text of first `h4`                            | `N/A`        |
//! | authors  | text of every `i`, joined with `", "`         | empty string |
//! | abstract | text of first `p`                             | `N/A`        |
//! | pdf_url  | first `a` whose href ends in `.pdf`, resolved | `N/A`        |

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::ExtractError;
use crate::model::{NOT_AVAILABLE, PaperRecord};

/// Default selector for the title heading.
pub const DEFAULT_TITLE_SELECTOR: &str = "h4";
/// Default selector for author names.
pub const DEFAULT_AUTHOR_SELECTOR: &str = "i";
/// Default selector for the abstract paragraph.
pub const DEFAULT_ABSTRACT_SELECTOR: &str = "p";
/// Default href suffix identifying the PDF link.
pub const DEFAULT_PDF_SUFFIX: &str = ".pdf";

/// Separator placed between author names.
const AUTHOR_SEPARATOR: &str = ", ";

/// Outcome of looking for the PDF link on a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfLink {
    /// Found and resolved to an absolute URL.
    Resolved(Url),
    /// The page has no matching link.
    Absent,
    /// A matching link exists but its href could not be resolved.
    Unresolvable {
        /// The raw href attribute.
        href: String,
    },
}

impl PdfLink {
    /// Returns the URL when the link was resolved.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Resolved(url) => Some(url),
            Self::Absent | Self::Unresolvable { .. } => None,
        }
    }
}

/// Metadata read from one detail page, before sentinel substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
    pub pdf: PdfLink,
}

impl PaperMetadata {
    /// Renders the output row, substituting `N/A` for absent fields.
    #[must_use]
    pub fn to_record(&self, year: u16) -> PaperRecord {
        PaperRecord {
            year,
            title: self
                .title
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            authors: self.authors.join(AUTHOR_SEPARATOR),
            abstract_text: self
                .abstract_text
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            pdf_url: self
                .pdf
                .url()
                .map_or_else(|| NOT_AVAILABLE.to_string(), ToString::to_string),
        }
    }
}

/// Strategy for reading paper metadata out of a detail page.
pub trait MetadataExtractor: Send + Sync {
    /// Extracts metadata from `html`; relative links resolve against `base`.
    fn extract(&self, html: &str, base: &Url) -> PaperMetadata;
}

/// Selector configuration for [`StructuralExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub title: String,
    pub authors: String,
    pub abstract_text: String,
    pub pdf_suffix: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_SELECTOR.to_string(),
            authors: DEFAULT_AUTHOR_SELECTOR.to_string(),
            abstract_text: DEFAULT_ABSTRACT_SELECTOR.to_string(),
            pdf_suffix: DEFAULT_PDF_SUFFIX.to_string(),
        }
    }
}

/// Extracts metadata from fixed structural positions in the page.
#[derive(Debug, Clone)]
pub struct StructuralExtractor {
    title: Selector,
    authors: Selector,
    abstract_text: Selector,
    anchors: Selector,
    pdf_suffix: String,
}

impl StructuralExtractor {
    /// Creates an extractor with the default selectors.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in selectors; the `Result` mirrors
    /// [`with_selectors`](Self::with_selectors).
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_selectors(&SelectorConfig::default())
    }

    /// Creates an extractor from custom selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] when a selector does not parse.
    pub fn with_selectors(config: &SelectorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            title: parse_selector(&config.title)?,
            authors: parse_selector(&config.authors)?,
            abstract_text: parse_selector(&config.abstract_text)?,
            anchors: parse_selector("a[href]")?,
            pdf_suffix: config.pdf_suffix.clone(),
        })
    }

    fn first_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(element_text)
    }

    fn pdf_link(&self, document: &Html, base: &Url) -> PdfLink {
        let href = document
            .select(&self.anchors)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.ends_with(self.pdf_suffix.as_str()));

        match href {
            None => PdfLink::Absent,
            Some(href) => match base.join(href) {
                Ok(url) => PdfLink::Resolved(url),
                Err(_) => PdfLink::Unresolvable {
                    href: href.to_string(),
                },
            },
        }
    }
}

impl MetadataExtractor for StructuralExtractor {
    fn extract(&self, html: &str, base: &Url) -> PaperMetadata {
        let document = Html::parse_document(html);

        PaperMetadata {
            title: self.first_text(&document, &self.title),
            authors: document.select(&self.authors).map(element_text).collect(),
            abstract_text: self.first_text(&document, &self.abstract_text),
            pdf: self.pdf_link(&document, base),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
