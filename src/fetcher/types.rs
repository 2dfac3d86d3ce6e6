//! Values exchanged with page and asset fetchers

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitCondition {
    /// Navigation response received and the load event fired
    #[default]
    Load,
    /// Load event plus `document.readyState === 'complete'` with images settled
    Settled,
}

/// Per-request fetch options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub wait: WaitCondition,
}

impl FetchOptions {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            wait: WaitCondition::Load,
        }
    }

    #[must_use]
    pub fn with_wait(mut self, wait: WaitCondition) -> Self {
        self.wait = wait;
        self
    }
}

/// Rendered page as seen by the browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedPage {
    /// HTTP status of the main document, when the browser can report it
    pub status_code: Option<u16>,
    pub final_url: String,
    pub title: String,
    /// Rendered body text
    pub text: String,
    /// Serialized DOM
    pub html: String,
    /// `src` attribute values of every `<img>`, exactly as written in markup
    pub image_sources: Vec<String>,
    /// `href` attribute values of every `<a>` and `<area>`, as written
    pub link_hrefs: Vec<String>,
}

impl FetchedPage {
    /// True when the status is unknown or 2xx
    #[must_use]
    pub fn is_success_status(&self) -> bool {
        self.status_code.is_none_or(|code| (200..300).contains(&code))
    }
}

/// Fetch failures at the network or browser boundary
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// True for failures a whole-page retry may fix
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Navigation(_) | Self::Timeout { .. } | Self::Browser(_) | Self::Body(_) => true,
            Self::Http(code) => *code >= 500 || *code == 429,
        }
    }
}
