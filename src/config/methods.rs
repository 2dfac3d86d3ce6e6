//! Builder methods available for all states
//!
//! This module contains setters that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;

use super::builder::MirrorConfigBuilder;
use crate::crawl_engine::candidates::NamePattern;

impl<State> MirrorConfigBuilder<State> {
    /// Replace the frontier seeds (identifiers or URLs under the site base)
    #[must_use]
    pub fn seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.seeds = seeds.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn max_pages_per_section(mut self, max: u32) -> Self {
        self.config.max_pages_per_section = max;
        self
    }

    #[must_use]
    pub fn first_page_number(mut self, first: u32) -> Self {
        self.config.first_page_number = first;
        self
    }

    /// Set the consecutive-miss threshold that closes a section with hits
    ///
    /// With the default of 5, a section whose page 3 is its last live page is
    /// probed up to page 8 before closing.
    #[must_use]
    pub fn misses_after_hit(mut self, misses: u32) -> Self {
        self.config.misses_after_hit = misses;
        self
    }

    #[must_use]
    pub fn misses_before_hit(mut self, misses: u32) -> Self {
        self.config.misses_before_hit = misses;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn asset_timeout_secs(mut self, secs: u64) -> Self {
        self.config.asset_timeout_secs = secs;
        self
    }

    /// Set whole-page attempts for link-discovered pages (minimum 1)
    #[must_use]
    pub fn max_page_retries(mut self, retries: u8) -> Self {
        self.config.max_page_retries = retries;
        self
    }

    #[must_use]
    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    /// Set the politeness delay between consecutive requests
    ///
    /// Tests set this to 0.
    #[must_use]
    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn checkpoint_interval(mut self, accepted_pages: usize) -> Self {
        self.config.checkpoint_interval = accepted_pages;
        self
    }

    #[must_use]
    pub fn resume(mut self, resume: bool) -> Self {
        self.config.resume = resume;
        self
    }

    #[must_use]
    pub fn min_text_length(mut self, len: usize) -> Self {
        self.config.min_text_length = len;
        self
    }

    #[must_use]
    pub fn placeholder_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.placeholder_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn section_patterns(mut self, patterns: Vec<NamePattern>) -> Self {
        self.config.section_patterns = patterns;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.chrome_data_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn default_image_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.default_image_extension = ext.into();
        self
    }

    #[must_use]
    pub fn max_asset_bytes(mut self, bytes: usize) -> Self {
        self.config.max_asset_bytes = bytes;
        self
    }

    /// Hosts (e.g. `www.oldclubsite.co.uk`) whose anchor and area links are
    /// removed from mirrored pages
    #[must_use]
    pub fn old_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.old_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn strip_site_base_links(mut self, strip: bool) -> Self {
        self.config.strip_site_base_links = strip;
        self
    }

    #[must_use]
    pub fn rewrite_local_links(mut self, rewrite: bool) -> Self {
        self.config.rewrite_local_links = rewrite;
        self
    }

    #[must_use]
    pub fn excluded_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.excluded_patterns = patterns;
        self
    }
}
