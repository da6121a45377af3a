//! Anchor selection and crawl-target discovery.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::model::{PaperTarget, YearTarget};

/// First four-digit run in a link's text.
#[allow(clippy::expect_used)]
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})").expect("year regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid")); // Static selector, safe to panic

/// Structural filter over an anchor's `href` attribute.
///
/// An href matches when it starts with the prefix (if any) and ends with the
/// suffix (if any). A matcher with neither accepts every anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMatcher {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl LinkMatcher {
    /// Creates a matcher from optional prefix and suffix constraints.
    #[must_use]
    pub fn new(prefix: Option<String>, suffix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
            suffix: suffix.filter(|s| !s.is_empty()),
        }
    }

    /// Matches hrefs starting with `prefix`.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(Some(prefix.into()), None)
    }

    /// Matches hrefs ending with `suffix`.
    #[must_use]
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::new(None, Some(suffix.into()))
    }

    /// Returns whether `href` satisfies both constraints.
    #[must_use]
    pub fn matches(&self, href: &str) -> bool {
        self.prefix.as_deref().is_none_or(|p| href.starts_with(p))
            && self.suffix.as_deref().is_none_or(|s| href.ends_with(s))
    }
}

/// A matched anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Raw `href` attribute value.
    pub href: String,
    /// Trimmed text content of the anchor.
    pub text: String,
}

/// Returns every anchor whose href satisfies `matcher`, in document order.
#[must_use]
pub fn select_links(html: &str, matcher: &LinkMatcher) -> Vec<Link> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            matcher.matches(href).then(|| Link {
                href: href.to_string(),
                text: element.text().collect::<String>().trim().to_string(),
            })
        })
        .collect()
}

/// Extracts the first four-digit number in `text`.
#[must_use]
pub fn extract_year(text: &str) -> Option<u16> {
    YEAR_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Finds year listing pages on the homepage, keeping years inside `range`.
///
/// The year comes from the anchor text. Anchors without a year, outside the
/// range, or with an href that cannot be resolved against `base` are skipped.
#[must_use]
pub fn discover_years(
    html: &str,
    base: &Url,
    matcher: &LinkMatcher,
    range: &RangeInclusive<u16>,
) -> Vec<YearTarget> {
    select_links(html, matcher)
        .into_iter()
        .filter_map(|link| {
            let Some(year) = extract_year(&link.text) else {
                debug!(text = %link.text, href = %link.href, "no year in link text");
                return None;
            };
            if !range.contains(&year) {
                debug!(year, "year outside configured range");
                return None;
            }
            resolve(base, &link.href).map(|listing_url| YearTarget { year, listing_url })
        })
        .collect()
}

/// Finds paper detail pages on a year listing page.
#[must_use]
pub fn discover_papers(
    html: &str,
    base: &Url,
    matcher: &LinkMatcher,
    year: u16,
) -> Vec<PaperTarget> {
    select_links(html, matcher)
        .into_iter()
        .filter_map(|link| resolve(base, &link.href))
        .map(|detail_url| PaperTarget { detail_url, year })
        .collect()
}

/// Resolves an href against the base URL, logging and dropping failures.
pub(crate) fn resolve(base: &Url, href: &str) -> Option<Url> {
    match base.join(href) {
        Ok(url) => Some(url),
        Err(error) => {
            debug!(href, error = %error, "unresolvable href");
            None
        }
    }
}
