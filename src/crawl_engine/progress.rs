//! Progress reporting abstraction for mirror runs
//!
//! Defines the `ProgressReporter` trait for run lifecycle events and
//! provides a no-op and a logging implementation.

use log::{info, warn};

use super::crawl_types::{DiscoverySource, RunSummary};

/// Trait for reporting run progress at key lifecycle events
pub trait ProgressReporter: Send + Sync {
    /// A URL was fetched and classified
    fn report_page_tested(&self, url: &str, source: DiscoverySource, accepted: bool);

    /// Pagination probing of a section stopped
    fn report_section_closed(&self, section: &str, accepted: u32);

    /// A snapshot was written
    fn report_checkpoint_saved(&self, accepted: usize);

    /// A URL exhausted its retries
    fn report_error(&self, url: &str, error: &str);

    /// The run finished
    fn report_completed(&self, summary: &RunSummary);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_page_tested(&self, _url: &str, _source: DiscoverySource, _accepted: bool) {}

    #[inline(always)]
    fn report_section_closed(&self, _section: &str, _accepted: u32) {}

    #[inline(always)]
    fn report_checkpoint_saved(&self, _accepted: usize) {}

    #[inline(always)]
    fn report_error(&self, _url: &str, _error: &str) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &RunSummary) {}
}

/// Console progress through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_page_tested(&self, url: &str, source: DiscoverySource, accepted: bool) {
        let mark = if accepted { "OK " } else { "-- " };
        info!(target: "sitemirror::progress", "{mark}{url} ({source:?})");
    }

    fn report_section_closed(&self, section: &str, accepted: u32) {
        info!(target: "sitemirror::progress", "Section {section} closed with {accepted} pages");
    }

    fn report_checkpoint_saved(&self, accepted: usize) {
        info!(target: "sitemirror::progress", "Checkpoint saved ({accepted} accepted)");
    }

    fn report_error(&self, url: &str, error: &str) {
        warn!(target: "sitemirror::progress", "FAILED {url}: {error}");
    }

    fn report_completed(&self, summary: &RunSummary) {
        info!(
            target: "sitemirror::progress",
            "Done: {} tested, {} accepted, {} rejected, {} failed ({}%)",
            summary.tested,
            summary.accepted,
            summary.rejected,
            summary.failed,
            summary.success_rate
        );
    }
}
