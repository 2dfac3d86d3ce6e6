//! Core configuration type for a mirror run
//!
//! Every heuristic threshold the crawler uses is a field here with its default
//! taken from `utils::constants`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::crawl_engine::candidates::NamePattern;
use crate::utils::{
    DEFAULT_ASSET_TIMEOUT_SECS, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_FIRST_PAGE_NUMBER,
    DEFAULT_IMAGE_EXTENSION, DEFAULT_MAX_ASSET_BYTES, DEFAULT_MAX_PAGE_RETRIES,
    DEFAULT_MAX_PAGES_PER_SECTION, DEFAULT_MIN_TEXT_LENGTH, DEFAULT_MISSES_AFTER_HIT,
    DEFAULT_MISSES_BEFORE_HIT, DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_PLACEHOLDER_TITLES,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_REQUEST_DELAY_MS, DEFAULT_RETRY_BACKOFF_MS,
};

/// Configuration for a single site mirror run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Site base URL. Always ends with `/` once validated.
    pub(crate) site_base: String,

    /// Output root holding `pages/`, `assets/images/` and `checkpoint.json`.
    ///
    /// Always absolute once validated.
    pub(crate) storage_dir: PathBuf,

    /// Base-relative identifiers the frontier starts from
    pub(crate) seeds: Vec<String>,

    pub(crate) max_pages_per_section: u32,
    pub(crate) first_page_number: u32,

    /// Consecutive misses that close a section once it has an accepted page
    pub(crate) misses_after_hit: u32,

    /// Consecutive misses that close a section with no accepted page yet
    pub(crate) misses_before_hit: u32,

    pub(crate) page_load_timeout_secs: u64,
    pub(crate) probe_timeout_secs: u64,
    pub(crate) asset_timeout_secs: u64,

    /// Whole-page attempts for link-discovered URLs
    ///
    /// Probes always get a single attempt.
    pub(crate) max_page_retries: u8,
    pub(crate) retry_backoff_ms: u64,
    pub(crate) request_delay_ms: u64,

    /// Accepted pages between two snapshots
    pub(crate) checkpoint_interval: usize,

    /// Load `checkpoint.json` before crawling when it exists
    pub(crate) resume: bool,

    /// Liveness: trimmed text must be longer than this to count on its own
    pub(crate) min_text_length: usize,

    /// Liveness: titles that do not count as meaningful
    pub(crate) placeholder_titles: Vec<String>,

    /// Name patterns expanded into brute-forced section directories
    pub(crate) section_patterns: Vec<NamePattern>,

    pub(crate) headless: bool,

    /// Chrome profile directory. A temporary one is used when unset.
    pub(crate) chrome_data_dir: Option<PathBuf>,

    pub(crate) default_image_extension: String,
    pub(crate) max_asset_bytes: usize,

    /// Hosts whose links are dropped from mirrored markup
    pub(crate) old_domains: Vec<String>,

    /// Make absolute links into the site base relative to the mirror
    pub(crate) strip_site_base_links: bool,

    /// Rewrite links between mirrored pages to local filenames after the crawl
    pub(crate) rewrite_local_links: bool,

    /// Glob patterns (`*` wildcard) matched against base-relative identifiers
    pub(crate) excluded_patterns: Vec<String>,

    /// Compiled regex patterns from `excluded_patterns`
    #[serde(skip)]
    pub(crate) excluded_patterns_compiled: Vec<regex::Regex>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            site_base: String::new(),
            storage_dir: PathBuf::from("./mirror"),
            seeds: vec![String::new()],
            max_pages_per_section: DEFAULT_MAX_PAGES_PER_SECTION,
            first_page_number: DEFAULT_FIRST_PAGE_NUMBER,
            misses_after_hit: DEFAULT_MISSES_AFTER_HIT,
            misses_before_hit: DEFAULT_MISSES_BEFORE_HIT,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            asset_timeout_secs: DEFAULT_ASSET_TIMEOUT_SECS,
            max_page_retries: DEFAULT_MAX_PAGE_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            resume: true,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            placeholder_titles: DEFAULT_PLACEHOLDER_TITLES
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            section_patterns: Vec::new(),
            headless: true,
            chrome_data_dir: None,
            default_image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            max_asset_bytes: DEFAULT_MAX_ASSET_BYTES,
            old_domains: Vec::new(),
            strip_site_base_links: true,
            rewrite_local_links: true,
            excluded_patterns: Vec::new(),
            excluded_patterns_compiled: Vec::new(),
        }
    }
}

impl MirrorConfig {
    /// Load a config from a JSON file and validate it
    ///
    /// Missing fields take their defaults; `site_base` is required.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validated()
    }
}
