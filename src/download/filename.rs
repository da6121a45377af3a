//! Filename derivation for downloaded artifacts.

use url::Url;

/// Derives the on-disk filename from the URL's final path segment.
///
/// The segment is percent-decoded and sanitized for common filesystems.
/// Returns `None` when the URL has no usable final segment (e.g. it ends in `/`).
#[must_use]
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string());
    let sanitized = sanitize_filename(&decoded);
    is_safe_filename_segment(&sanitized).then_some(sanitized)
}

/// Replaces characters that are invalid on common filesystems.
///
/// / \ : * ? " < > | and control characters become `_`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_safe_filename_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}
