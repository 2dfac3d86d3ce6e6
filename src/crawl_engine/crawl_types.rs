//! Records and summaries produced by a mirror run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Error surfaced by the public run entry point
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// Browser could not be launched
    #[error("Browser error: {0}")]
    Browser(String),
    /// The run aborted, usually on an output directory failure
    #[error("Mirror error: {0}")]
    Run(String),
}

impl From<anyhow::Error> for MirrorError {
    fn from(err: anyhow::Error) -> Self {
        Self::Run(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `MirrorError`
pub type MirrorResult<T> = Result<T, MirrorError>;

/// How a URL entered the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoverySource {
    Link,
    PaginationGuess,
    PatternGuess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Pending,
    Accepted,
    Rejected,
    Error,
}

/// One URL known to the crawl, keyed by its base-relative identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    pub source: DiscoverySource,
    pub visited: bool,
    pub outcome: Outcome,
    pub title: String,
    pub content_length: usize,
    pub section: String,
    pub page_number: u32,
    /// Rejection or failure reason
    pub reason: Option<String>,
    /// Mirrored filename under `pages/`
    pub local_file: Option<String>,
    /// Identifier relative links resolve against, when a redirect moved the page
    pub link_base: Option<String>,
}

impl UrlRecord {
    #[must_use]
    pub fn pending(url: impl Into<String>, source: DiscoverySource) -> Self {
        let url = url.into();
        Self {
            section: crate::utils::section_of(&url),
            page_number: crate::utils::page_number_of(&url),
            url,
            source,
            visited: false,
            outcome: Outcome::Pending,
            title: String::new(),
            content_length: 0,
            reason: None,
            local_file: None,
            link_base: None,
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }

    /// Identifier the page's relative links resolve against
    #[must_use]
    pub fn link_base(&self) -> &str {
        self.link_base.as_deref().unwrap_or(&self.url)
    }
}

/// Pages sharing a leading path segment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    /// Identifier of the section's base page, once accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Accepted pages by page number (0 = base page)
    pub pages: BTreeMap<u32, String>,
    /// Accepted pages of any kind in the section
    pub accepted: u32,
    /// True for `name/...` sections, the only ones pagination applies to
    #[serde(default)]
    pub directory: bool,
    /// Set once pagination probing has stopped
    pub closed: bool,
}

impl Section {
    #[must_use]
    pub fn new(name: impl Into<String>, directory: bool) -> Self {
        Self {
            name: name.into(),
            directory,
            ..Self::default()
        }
    }
}

/// URL whose retries were exhausted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUrl {
    pub url: String,
    pub reason: String,
    pub attempts: u8,
}

/// End-of-run counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub tested: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Accepted over tested, in percent
    pub success_rate: f64,
    /// Images mapped to local files
    pub assets: usize,
    /// Relative `.html` links in the mirror whose target is missing
    pub broken_local_links: usize,
}

/// Percentage of `part` in `whole`, 0 when nothing was tested
#[must_use]
pub fn success_rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        // Counts stay far below f64's exact integer range
        #[allow(clippy::cast_precision_loss)]
        let rate = part as f64 * 100.0 / whole as f64;
        (rate * 10.0).round() / 10.0
    }
}
