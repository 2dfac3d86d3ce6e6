//! Getter methods for `MirrorConfig`

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::MirrorConfig;
use crate::crawl_engine::candidates::NamePattern;
use crate::utils::{CHECKPOINT_FILENAME, IMAGES_DIR, PAGES_DIR};

impl MirrorConfig {
    #[must_use]
    pub fn site_base(&self) -> &str {
        &self.site_base
    }

    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    #[must_use]
    pub fn pages_dir(&self) -> PathBuf {
        self.storage_dir.join(PAGES_DIR)
    }

    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.storage_dir.join(IMAGES_DIR)
    }

    #[must_use]
    pub fn checkpoint_path(&self) -> PathBuf {
        self.storage_dir.join(CHECKPOINT_FILENAME)
    }

    #[must_use]
    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    #[must_use]
    pub fn max_pages_per_section(&self) -> u32 {
        self.max_pages_per_section
    }

    #[must_use]
    pub fn first_page_number(&self) -> u32 {
        self.first_page_number
    }

    #[must_use]
    pub fn misses_after_hit(&self) -> u32 {
        self.misses_after_hit
    }

    #[must_use]
    pub fn misses_before_hit(&self) -> u32 {
        self.misses_before_hit
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    #[must_use]
    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }

    #[must_use]
    pub fn max_page_retries(&self) -> u8 {
        self.max_page_retries
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    #[must_use]
    pub fn resume(&self) -> bool {
        self.resume
    }

    #[must_use]
    pub fn min_text_length(&self) -> usize {
        self.min_text_length
    }

    #[must_use]
    pub fn placeholder_titles(&self) -> &[String] {
        &self.placeholder_titles
    }

    #[must_use]
    pub fn section_patterns(&self) -> &[NamePattern] {
        &self.section_patterns
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }

    #[must_use]
    pub fn default_image_extension(&self) -> &str {
        &self.default_image_extension
    }

    #[must_use]
    pub fn max_asset_bytes(&self) -> usize {
        self.max_asset_bytes
    }

    #[must_use]
    pub fn old_domains(&self) -> &[String] {
        &self.old_domains
    }

    #[must_use]
    pub fn strip_site_base_links(&self) -> bool {
        self.strip_site_base_links
    }

    #[must_use]
    pub fn rewrite_local_links(&self) -> bool {
        self.rewrite_local_links
    }

    #[must_use]
    pub fn excluded_patterns(&self) -> &[String] {
        &self.excluded_patterns
    }

    /// Check a base-relative identifier against the exclusion globs
    #[must_use]
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_patterns_compiled
            .iter()
            .any(|re| re.is_match(id))
    }
}
