//! Whole-page retry for link-discovered URLs
//!
//! An explicit attempt loop with a fixed backoff. Probes never go through
//! here: a speculative URL that fails once is simply not there.

use log::warn;
use std::time::Duration;

use crate::config::MirrorConfig;
use crate::fetcher::{FetchError, FetchOptions, FetchedPage, PageFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u8, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    #[must_use]
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(config.max_page_retries(), config.retry_backoff())
    }
}

/// Result of a retried fetch with the number of attempts made
#[derive(Debug)]
pub struct RetriedFetch {
    pub result: Result<FetchedPage, FetchError>,
    pub attempts: u8,
}

/// Fetch `url`, retrying transient errors up to `policy.max_attempts` times
///
/// A fetched page is returned on the first success whatever its status; the
/// classifier decides what a 404 means.
pub async fn fetch_with_retry<P: PageFetcher>(
    fetcher: &P,
    url: &str,
    options: &FetchOptions,
    policy: &RetryPolicy,
) -> RetriedFetch {
    let mut attempt = 0;

    loop {
        attempt += 1;

        match fetcher.fetch(url, options).await {
            Ok(page) => {
                return RetriedFetch {
                    result: Ok(page),
                    attempts: attempt,
                };
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    target: "sitemirror::retry",
                    "Attempt {attempt}/{} failed for {url}: {e}, retrying in {}ms",
                    policy.max_attempts,
                    policy.backoff.as_millis()
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                return RetriedFetch {
                    result: Err(e),
                    attempts: attempt,
                };
            }
        }
    }
}
