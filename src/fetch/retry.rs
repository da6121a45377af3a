//! Fixed-delay retry policy for page fetches.
//!
//! Failed attempts are classified into a [`FailureType`] so that logs can tell
//! a dead link from a flaky server. By default the policy retries both kinds
//! identically, waiting the same fixed delay before every retry; turning off
//! [`RetryPolicy::retry_permanent_failures`] makes it give up early on
//! permanent failures such as a 404.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use proceedings_crawler::fetch::{FetchError, RetryDecision, RetryPolicy, classify_error};
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(2));
//! let error = FetchError::http_status("https://papers.nips.cc", 503);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => println!("attempt {attempt} in {delay:?}"),
//!     RetryDecision::DoNotRetry { reason } => println!("giving up: {reason}"),
//! }
//! ```

use std::time::Duration;

use tracing::debug;

use super::FetchError;

/// Default number of attempts per page (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Classification of a failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// May succeed on retry: timeouts, connection errors, 5xx, 408, 429.
    Transient,
    /// Will not succeed on retry: most 4xx, invalid URLs.
    Permanent,
}

/// Decision on whether to retry a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry configuration: a bounded attempt count and one fixed delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    retry_permanent_failures: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            retry_permanent_failures: true,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget (clamped to at least 1) and delay.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            ..Self::default()
        }
    }

    /// Sets whether permanent failures consume the remaining budget.
    #[must_use]
    pub fn with_retry_permanent_failures(mut self, retry: bool) -> Self {
        self.retry_permanent_failures = retry;
        self
    }

    /// Returns the maximum number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the fixed delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns whether permanent failures are retried.
    #[must_use]
    pub fn retry_permanent_failures(&self) -> bool {
        self.retry_permanent_failures
    }

    /// Decides what to do after `attempt` (1-indexed) failed.
    #[must_use]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent && !self.retry_permanent_failures {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}

/// Classifies a fetch error for retry decisions and diagnostics.
///
/// | Error | Type |
/// |-------|------|
/// | Timeout, Network, Body | Transient |
/// | HTTP 408, 429, 5xx | Transient |
/// | Other HTTP statuses | Permanent |
/// | InvalidUrl | Permanent |
#[must_use]
pub fn classify_error(error: &FetchError) -> FailureType {
    match error {
        FetchError::Timeout { .. } | FetchError::Network { .. } | FetchError::Body { .. } => {
            FailureType::Transient
        }
        FetchError::HttpStatus { status, .. } => classify_http_status(*status),
        FetchError::InvalidUrl { .. } => FailureType::Permanent,
    }
}

fn classify_http_status(status: u16) -> FailureType {
    match status {
        408 | 429 => FailureType::Transient,
        500..=599 => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}
