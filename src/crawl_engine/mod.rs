//! Crawl Engine Module
//!
//! Discovery and classification for a mirror run: the frontier, candidate
//! generation, liveness classification, page retry and the orchestrator that
//! threads a single `CrawlState` through all of them.

pub mod candidates;
pub mod crawl_types;
pub mod frontier;
pub mod liveness;
pub mod orchestrator;
pub mod progress;
pub mod retry;
pub mod state;

pub use candidates::{NamePattern, PaginationProbe, expand_section_names, pagination_url, section_dir_url};
pub use crawl_types::{
    DiscoverySource, FailedUrl, MirrorError, MirrorResult, Outcome, RunSummary, Section, UrlRecord,
};
pub use frontier::Frontier;
pub use liveness::{LivenessClassifier, LivenessVerdict};
pub use orchestrator::SiteMirror;
pub use progress::{LogProgress, NoOpProgress, ProgressReporter};
pub use retry::{RetriedFetch, RetryPolicy, fetch_with_retry};
pub use state::CrawlState;
