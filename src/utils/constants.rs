//! Shared configuration defaults for sitemirror
//!
//! Every heuristic the crawler depends on lives here as a named default so
//! that `MirrorConfig` is the single place a run's tuning comes from.

/// Minimum trimmed text length (exclusive) for a page to count as live
///
/// Pages whose rendered text is this short or shorter are only accepted when
/// they carry a meaningful title (image-only pages).
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 5;

/// Titles that do not count as meaningful for liveness
pub const DEFAULT_PLACEHOLDER_TITLES: &[&str] = &["Untitled"];

/// Highest `pageN.html` index probed for any section
pub const DEFAULT_MAX_PAGES_PER_SECTION: u32 = 50;

/// First `pageN.html` index probed for a section
pub const DEFAULT_FIRST_PAGE_NUMBER: u32 = 1;

/// Consecutive misses that close a section once one of its pages was accepted
///
/// The legacy scripts used 3, 5, 8 and 10 for this in different places.
pub const DEFAULT_MISSES_AFTER_HIT: u32 = 5;

/// Consecutive misses that close a section that has no accepted page yet
pub const DEFAULT_MISSES_BEFORE_HIT: u32 = 2;

/// Timeout for `page.goto()` on pages reached through links
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Timeout for speculative probes (pagination and name guesses)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Timeout for a single image download
pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 30;

/// Whole-page download attempts before a URL is recorded as failed
pub const DEFAULT_MAX_PAGE_RETRIES: u8 = 3;

/// Fixed delay between whole-page retry attempts
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 2_000;

/// Politeness delay inserted between consecutive requests
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

/// Snapshot cadence in accepted pages
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;

/// Extension used for images whose URL carries none
pub const DEFAULT_IMAGE_EXTENSION: &str = "gif";

/// Largest image accepted by the asset fetcher
pub const DEFAULT_MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;

/// Length of the hex digest embedded in asset filenames
pub const ASSET_HASH_LEN: usize = 8;

/// Directory (under storage) holding rewritten pages
pub const PAGES_DIR: &str = "pages";

/// Directory (under storage) holding downloaded images
pub const IMAGES_DIR: &str = "assets/images";

/// Snapshot filename (under storage)
pub const CHECKPOINT_FILENAME: &str = "checkpoint.json";

/// Chrome user agent used for the browser and for asset requests
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
