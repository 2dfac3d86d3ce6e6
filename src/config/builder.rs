//! Type-safe builder for `MirrorConfig` using the typestate pattern
//!
//! `build()` only exists once both the storage directory and the site base
//! are set.

use anyhow::{Result, anyhow};
use regex::Regex;
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::MirrorConfig;
use crate::utils::UrlNormalizer;

/// Compile a glob pattern into a regex
///
/// `*` matches any sequence; the pattern is anchored to the full identifier.
///
/// # Errors
///
/// Returns an error if the resulting regex pattern is invalid.
fn compile_glob_pattern(pattern: &str) -> Result<Regex> {
    let regex_pattern = regex::escape(pattern).replace(r"\*", ".*");
    let anchored = format!("^{regex_pattern}$");

    Regex::new(&anchored).map_err(|e| anyhow!("Invalid glob pattern '{pattern}': {e}"))
}

// Type states for the builder
pub struct WithStorageDir;
pub struct WithSiteBase;

pub struct MirrorConfigBuilder<State = ()> {
    pub(crate) config: MirrorConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for MirrorConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: MirrorConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl MirrorConfig {
    /// Create a builder for configuring a `MirrorConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> MirrorConfigBuilder<()> {
        MirrorConfigBuilder::default()
    }

    /// Normalize and check a config, compiling its exclusion patterns
    pub(crate) fn validated(mut self) -> Result<Self> {
        if self.site_base.trim().is_empty() {
            return Err(anyhow!("site_base is required"));
        }
        let normalizer = UrlNormalizer::new(&self.site_base)?;
        self.site_base = normalizer.base().to_string();

        self.storage_dir = std::path::absolute(&self.storage_dir).map_err(|e| {
            anyhow!(
                "Cannot resolve storage_dir '{}': {e}",
                self.storage_dir.display()
            )
        })?;

        if self.first_page_number > self.max_pages_per_section {
            return Err(anyhow!(
                "first_page_number ({}) exceeds max_pages_per_section ({})",
                self.first_page_number,
                self.max_pages_per_section
            ));
        }
        if self.misses_after_hit == 0 || self.misses_before_hit == 0 {
            return Err(anyhow!("miss thresholds must be at least 1"));
        }
        if self.max_page_retries == 0 {
            return Err(anyhow!("max_page_retries must be at least 1"));
        }
        if self.checkpoint_interval == 0 {
            return Err(anyhow!("checkpoint_interval must be at least 1"));
        }
        if self.seeds.is_empty() {
            self.seeds.push(String::new());
        }

        self.default_image_extension = self
            .default_image_extension
            .trim_start_matches('.')
            .to_ascii_lowercase();
        if self.default_image_extension.is_empty() {
            return Err(anyhow!("default_image_extension must not be empty"));
        }

        self.excluded_patterns_compiled = self
            .excluded_patterns
            .iter()
            .map(|p| compile_glob_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(self)
    }
}

impl MirrorConfigBuilder<()> {
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> MirrorConfigBuilder<WithStorageDir> {
        self.config.storage_dir = dir.into();
        MirrorConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl MirrorConfigBuilder<WithStorageDir> {
    pub fn site_base(mut self, url: impl Into<String>) -> MirrorConfigBuilder<WithSiteBase> {
        let url_string = url.into();

        // Add https:// if no scheme is present
        self.config.site_base =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        MirrorConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl MirrorConfigBuilder<WithSiteBase> {
    pub fn build(self) -> Result<MirrorConfig> {
        self.config.validated()
    }
}
