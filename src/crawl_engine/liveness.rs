//! Liveness classification for fetched pages
//!
//! The legacy host answers unknown URLs with an empty 200 page instead of a
//! 404, so status alone cannot tell live pages from soft-404s. A page is live
//! when it has some text, or when it has a real title (image-only pages).
//! A soft-404 that carries a real title is therefore accepted.

use log::debug;

use crate::config::MirrorConfig;
use crate::fetcher::{FetchError, FetchedPage};

/// Classifier verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessVerdict {
    pub is_live: bool,
    /// Why the page was rejected
    pub reason: Option<String>,
}

impl LivenessVerdict {
    #[must_use]
    pub fn live() -> Self {
        Self {
            is_live: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_live: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LivenessClassifier {
    min_text_length: usize,
    placeholder_titles: Vec<String>,
}

impl LivenessClassifier {
    #[must_use]
    pub fn new(min_text_length: usize, placeholder_titles: &[String]) -> Self {
        Self {
            min_text_length,
            placeholder_titles: placeholder_titles
                .iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(config.min_text_length(), config.placeholder_titles())
    }

    /// Classify the outcome of a fetch
    #[must_use]
    pub fn classify(&self, outcome: &Result<FetchedPage, FetchError>) -> LivenessVerdict {
        match outcome {
            Ok(page) => self.classify_page(page),
            Err(e) => LivenessVerdict::rejected(e.to_string()),
        }
    }

    #[must_use]
    pub fn classify_page(&self, page: &FetchedPage) -> LivenessVerdict {
        if !page.is_success_status() {
            let status = page.status_code.unwrap_or_default();
            debug!(target: "sitemirror::liveness", "HTTP {status} for {}", page.final_url);
            return LivenessVerdict::rejected(format!("HTTP {status}"));
        }

        if page.text.trim().chars().count() > self.min_text_length {
            return LivenessVerdict::live();
        }

        if self.is_meaningful_title(&page.title) {
            return LivenessVerdict::live();
        }

        LivenessVerdict::rejected("Empty content")
    }

    fn is_meaningful_title(&self, title: &str) -> bool {
        let title = title.trim();
        !title.is_empty() && !self.placeholder_titles.contains(&title.to_lowercase())
    }
}
