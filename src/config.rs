//! Crawl configuration: built-in defaults, TOML file overrides, validation.
//!
//! Resolution order (later wins): [`CrawlConfig::default`] → config file →
//! command-line flags. The config file is optional; when `--config` is not
//! given the default location is consulted:
//!
//! 1. `$XDG_CONFIG_HOME/proceedings-crawler/config.toml`
//! 2. `$HOME/.config/proceedings-crawler/config.toml`

use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::extract::{LinkMatcher, SelectorConfig};
use crate::user_agent;

/// Default site to crawl.
pub const DEFAULT_BASE_URL: &str = "https://papers.nips.cc";
/// Default output root.
pub const DEFAULT_OUTPUT_DIR: &str = "proceedings";
/// Default result file name inside the output root.
pub const DEFAULT_CSV_FILE: &str = "output.csv";
/// Default first year (inclusive).
pub const DEFAULT_START_YEAR: u16 = 2019;
/// Default last year (inclusive).
pub const DEFAULT_END_YEAR: u16 = 2023;
/// Default worker slots.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Default per-page request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Default href prefix of year links on the homepage.
pub const DEFAULT_YEAR_LINK_PREFIX: &str = "/paper_files/paper/";
/// Default href prefix of paper links on a listing page.
pub const DEFAULT_PAPER_LINK_PREFIX: &str = "/paper_files/paper/";
/// Default href suffix of paper links on a listing page.
pub const DEFAULT_PAPER_LINK_SUFFIX: &str = ".html";

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;
/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;
/// Maximum allowed attempts per page.
const MAX_ATTEMPTS: u32 = 10;
/// Maximum allowed timeout in seconds.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The base URL does not parse.
    #[error("invalid base URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// A value is outside its accepted range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Fully resolved crawl settings.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Site root; every relative href resolves against it.
    pub base_url: Url,
    /// Root directory for the CSV file and per-year PDF folders.
    pub output_dir: PathBuf,
    /// Result file name inside `output_dir`.
    pub csv_file: String,
    /// First year to crawl (inclusive).
    pub start_year: u16,
    /// Last year to crawl (inclusive).
    pub end_year: u16,
    /// Worker slots shared by year and paper jobs.
    pub concurrency: usize,
    /// Attempts per page, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Per-page request timeout.
    pub request_timeout: Duration,
    /// Whole-request timeout for PDF downloads.
    pub download_timeout: Duration,
    /// Fixed sleep before each page request and download.
    pub request_delay: Duration,
    /// Whether permanent failures (e.g. 404) use up the remaining attempts.
    pub retry_permanent_failures: bool,
    pub user_agent: String,
    pub year_links: LinkMatcher,
    pub paper_links: LinkMatcher,
    pub selectors: SelectorConfig,
}

impl Default for CrawlConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"), // Static URL, safe to panic
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            csv_file: DEFAULT_CSV_FILE.to_string(),
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: crate::fetch::DEFAULT_MAX_ATTEMPTS,
            retry_delay: crate::fetch::DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_timeout: crate::download::DEFAULT_DOWNLOAD_TIMEOUT,
            request_delay: Duration::ZERO,
            retry_permanent_failures: true,
            user_agent: user_agent::default_user_agent(),
            year_links: LinkMatcher::prefix(DEFAULT_YEAR_LINK_PREFIX),
            paper_links: LinkMatcher::new(
                Some(DEFAULT_PAPER_LINK_PREFIX.to_string()),
                Some(DEFAULT_PAPER_LINK_SUFFIX.to_string()),
            ),
            selectors: SelectorConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Inclusive range of years to crawl.
    #[must_use]
    pub fn year_range(&self) -> RangeInclusive<u16> {
        self.start_year..=self.end_year
    }

    /// Full path of the result file.
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_file)
    }

    /// Overlays every value set in `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` does not parse.
    pub fn merge(&mut self, file: &FileConfig) -> Result<(), ConfigError> {
        if let Some(base_url) = &file.base_url {
            self.base_url = parse_base_url(base_url)?;
        }
        if let Some(output_dir) = &file.output_dir {
            self.output_dir.clone_from(output_dir);
        }
        if let Some(csv_file) = &file.csv_file {
            self.csv_file.clone_from(csv_file);
        }
        if let Some(start_year) = file.start_year {
            self.start_year = start_year;
        }
        if let Some(end_year) = file.end_year {
            self.end_year = end_year;
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(max_attempts) = file.max_attempts {
            self.max_attempts = max_attempts;
        }
        if let Some(ms) = file.retry_delay_ms {
            self.retry_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.download_timeout_secs {
            self.download_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = file.request_delay_ms {
            self.request_delay = Duration::from_millis(ms);
        }
        if let Some(retry) = file.retry_permanent_failures {
            self.retry_permanent_failures = retry;
        }
        if let Some(user_agent) = &file.user_agent {
            self.user_agent.clone_from(user_agent);
        }
        if let Some(prefix) = &file.year_link_prefix {
            self.year_links = LinkMatcher::prefix(prefix.clone());
        }
        if file.paper_link_prefix.is_some() || file.paper_link_suffix.is_some() {
            self.paper_links = LinkMatcher::new(
                file.paper_link_prefix
                    .clone()
                    .or_else(|| Some(DEFAULT_PAPER_LINK_PREFIX.to_string())),
                file.paper_link_suffix
                    .clone()
                    .or_else(|| Some(DEFAULT_PAPER_LINK_SUFFIX.to_string())),
            );
        }
        if let Some(title) = &file.title_selector {
            self.selectors.title.clone_from(title);
        }
        if let Some(authors) = &file.author_selector {
            self.selectors.authors.clone_from(authors);
        }
        if let Some(abstract_text) = &file.abstract_selector {
            self.selectors.abstract_text.clone_from(abstract_text);
        }
        if let Some(pdf_suffix) = &file.pdf_suffix {
            self.selectors.pdf_suffix.clone_from(pdf_suffix);
        }
        Ok(())
    }

    /// Checks every value against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "base_url",
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.start_year > self.end_year {
            return Err(ConfigError::invalid(
                "start_year",
                format!(
                    "start year {} is after end year {}",
                    self.start_year, self.end_year
                ),
            ));
        }
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::invalid(
                "concurrency",
                format!(
                    "{} is outside {MIN_CONCURRENCY}..={MAX_CONCURRENCY}",
                    self.concurrency
                ),
            ));
        }
        if !(1..=MAX_ATTEMPTS).contains(&self.max_attempts) {
            return Err(ConfigError::invalid(
                "max_attempts",
                format!("{} is outside 1..={MAX_ATTEMPTS}", self.max_attempts),
            ));
        }
        validate_timeout("request_timeout_secs", self.request_timeout)?;
        validate_timeout("download_timeout_secs", self.download_timeout)?;
        if self.csv_file.trim().is_empty() {
            return Err(ConfigError::invalid("csv_file", "must not be empty"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }
        Ok(())
    }
}

fn validate_timeout(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    let secs = value.as_secs();
    if value.is_zero() || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::invalid(
            field,
            format!("{secs}s is outside 1..={MAX_TIMEOUT_SECS}"),
        ));
    }
    Ok(())
}

/// Parses a base URL, mapping failures to [`ConfigError::InvalidUrl`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when `value` is not an absolute URL.
pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}

/// TOML-backed file configuration; every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub csv_file: Option<String>,
    pub start_year: Option<u16>,
    pub end_year: Option<u16>,
    pub concurrency: Option<usize>,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
    pub request_delay_ms: Option<u64>,
    pub retry_permanent_failures: Option<bool>,
    pub user_agent: Option<String>,
    pub year_link_prefix: Option<String>,
    pub paper_link_prefix: Option<String>,
    pub paper_link_suffix: Option<String>,
    pub title_selector: Option<String>,
    pub author_selector: Option<String>,
    pub abstract_selector: Option<String>,
    pub pdf_suffix: Option<String>,
}

impl FileConfig {
    /// Parses TOML text. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }
}

/// Resolves the default config path from `XDG_CONFIG_HOME` or `HOME`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("proceedings-crawler")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("proceedings-crawler")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file at `explicit`, or at the default path if it exists.
///
/// An explicit path must exist; a missing default file yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`ConfigError`] if a file is present but unreadable or invalid.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>, ConfigError> {
    if let Some(path) = explicit {
        return FileConfig::load(path).map(Some);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => FileConfig::load(&path).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url.as_str(), "https://papers.nips.cc/");
        assert_eq!(config.year_range(), 2019..=2023);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.csv_path(), PathBuf::from("proceedings/output.csv"));
    }

    #[test]
    fn test_parse_and_merge_file_config() {
        let raw = r#"
            base_url = "http://localhost:8080"
            output_dir = "/tmp/crawl"
            start_year = 2020
            end_year = 2021
            concurrency = 4
            max_attempts = 5
            retry_delay_ms = 100
            request_timeout_secs = 7
            retry_permanent_failures = false
            paper_link_suffix = "-Abstract.html"
            title_selector = "h1"
        "#;
        let file = FileConfig::parse(raw, Path::new("config.toml")).unwrap();
        let mut config = CrawlConfig::default();
        config.merge(&file).unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/crawl"));
        assert_eq!(config.year_range(), 2020..=2021);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert!(!config.retry_permanent_failures);
        assert!(config.paper_links.matches("/paper_files/paper/2020/hash/x-Abstract.html"));
        assert!(!config.paper_links.matches("/paper_files/paper/2020/hash/x-Paper.html"));
        assert_eq!(config.selectors.title, "h1");
        assert_eq!(config.selectors.authors, "i");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = FileConfig::parse("concurency = 3", Path::new("config.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_base_url_rejected_on_merge() {
        let file = FileConfig {
            base_url: Some("not a url".to_string()),
            ..FileConfig::default()
        };
        let result = CrawlConfig::default().merge(&file);
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_validate_rejects_inverted_year_range() {
        let config = CrawlConfig {
            start_year: 2024,
            end_year: 2019,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "start_year", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_concurrency() {
        for concurrency in [0, 101] {
            let config = CrawlConfig {
                concurrency,
                ..CrawlConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid { field: "concurrency", .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_attempts() {
        let config = CrawlConfig {
            request_timeout: Duration::ZERO,
            ..CrawlConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CrawlConfig {
            max_attempts: 0,
            ..CrawlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_base() {
        let config = CrawlConfig {
            base_url: Url::parse("ftp://papers.nips.cc").unwrap(),
            ..CrawlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "base_url", .. })
        ));
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = load_file_config(Some(temp.path().join("missing.toml").as_path()));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("crawl.toml");
        fs::write(&path, "concurrency = 2\n").unwrap();
        let loaded = load_file_config(Some(path.as_path())).unwrap().unwrap();
        assert_eq!(loaded.concurrency, Some(2));
    }
}
