//! The single mutable value a run threads through its components
//!
//! `CrawlState` owns the frontier, every URL record, the section table, the
//! asset mapping and the counters. The orchestrator passes it by `&mut`, so
//! there is no shared state and no locking.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use super::crawl_types::{
    DiscoverySource, FailedUrl, Outcome, RunSummary, Section, UrlRecord, success_rate,
};
use super::frontier::Frontier;
use crate::checkpoint::{AcceptedEntry, RejectedEntry, Snapshot, SnapshotSummary};
use crate::fetcher::FetchedPage;
use crate::utils::{is_directory_section, leaf_of};

#[derive(Debug, Default)]
pub struct CrawlState {
    frontier: Frontier,
    records: Vec<UrlRecord>,
    index: HashMap<String, usize>,
    sections: BTreeMap<String, Section>,
    failed: Vec<FailedUrl>,
    asset_map: BTreeMap<String, String>,
    asset_sequence: usize,
    /// Filename under `pages/` to the identifier written there
    page_files: HashMap<String, String>,
    tested: usize,
    accepted: usize,
    rejected: usize,
    accepted_since_checkpoint: usize,
}

impl CrawlState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// Queue a link-discovered URL, creating its record
    pub fn enqueue(&mut self, url: &str, source: DiscoverySource) -> bool {
        let queued = self.frontier.enqueue(url);
        if queued {
            self.ensure_record(url, source);
        }
        queued
    }

    #[must_use]
    pub fn record(&self, url: &str) -> Option<&UrlRecord> {
        self.index.get(url).map(|&i| &self.records[i])
    }

    #[must_use]
    pub fn records(&self) -> &[UrlRecord] {
        &self.records
    }

    pub fn accepted_records(&self) -> impl Iterator<Item = &UrlRecord> {
        self.records.iter().filter(|r| r.is_accepted())
    }

    fn ensure_record(&mut self, url: &str, source: DiscoverySource) -> &mut UrlRecord {
        let i = match self.index.get(url) {
            Some(&i) => i,
            None => {
                self.records.push(UrlRecord::pending(url, source));
                let i = self.records.len() - 1;
                self.index.insert(url.to_string(), i);
                i
            }
        };
        &mut self.records[i]
    }

    /// Record an accepted page and account it to its section
    pub fn record_accepted(&mut self, url: &str, source: DiscoverySource, page: &FetchedPage) {
        let record = self.ensure_record(url, source);
        record.visited = true;
        record.outcome = Outcome::Accepted;
        record.title = page.title.trim().to_string();
        record.content_length = page.html.len();
        record.reason = None;

        let section_name = record.section.clone();
        let page_number = record.page_number;

        let section = self
            .sections
            .entry(section_name.clone())
            .or_insert_with(|| Section::new(section_name, false));
        section.directory |= is_directory_section(url);
        section.accepted += 1;
        if leaf_of(url).is_none() {
            section.pages.entry(page_number).or_insert_with(|| url.to_string());
            if page_number == 0 && section.base.is_none() {
                section.base = Some(url.to_string());
            }
        }

        self.tested += 1;
        self.accepted += 1;
        self.accepted_since_checkpoint += 1;
    }

    pub fn record_rejected(&mut self, url: &str, source: DiscoverySource, reason: &str) {
        let record = self.ensure_record(url, source);
        record.visited = true;
        record.outcome = Outcome::Rejected;
        record.reason = Some(reason.to_string());

        self.tested += 1;
        self.rejected += 1;
    }

    /// Record a page whose retries were exhausted
    pub fn record_failed(&mut self, url: &str, source: DiscoverySource, reason: &str, attempts: u8) {
        let record = self.ensure_record(url, source);
        record.visited = true;
        record.outcome = Outcome::Error;
        record.reason = Some(reason.to_string());

        self.failed.push(FailedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
            attempts,
        });
        self.tested += 1;
    }

    /// Remember where a redirected page landed
    pub fn set_link_base(&mut self, url: &str, base: &str) {
        if let Some(&i) = self.index.get(url) {
            self.records[i].link_base = (base != url).then(|| base.to_string());
        }
    }

    pub fn set_local_file(&mut self, url: &str, file: &str) {
        if let Some(&i) = self.index.get(url) {
            self.records[i].local_file = Some(file.to_string());
            self.page_files.insert(file.to_string(), url.to_string());
        }
    }

    /// Identifier already mirrored into `file`
    #[must_use]
    pub fn page_file_owner(&self, file: &str) -> Option<&str> {
        self.page_files.get(file).map(String::as_str)
    }

    #[must_use]
    pub fn sections(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Directory sections still waiting for pagination probing
    #[must_use]
    pub fn open_directory_sections(&self) -> Vec<String> {
        self.sections
            .values()
            .filter(|s| s.directory && !s.closed)
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn close_section(&mut self, name: &str) {
        let section = self
            .sections
            .entry(name.to_string())
            .or_insert_with(|| Section::new(name, true));
        section.closed = true;
    }

    #[must_use]
    pub fn asset_map(&self) -> &BTreeMap<String, String> {
        &self.asset_map
    }

    #[must_use]
    pub fn asset_path(&self, source: &str) -> Option<&str> {
        self.asset_map.get(source).map(String::as_str)
    }

    /// Sequence number for the next stored asset
    #[must_use]
    pub fn next_asset_sequence(&self) -> usize {
        self.asset_sequence + 1
    }

    pub fn map_asset(&mut self, source: &str, local_path: String) {
        if self.asset_map.insert(source.to_string(), local_path).is_none() {
            self.asset_sequence += 1;
        }
    }

    #[must_use]
    pub fn failed(&self) -> &[FailedUrl] {
        &self.failed
    }

    /// True once `interval` pages were accepted since the last snapshot
    #[must_use]
    pub fn checkpoint_due(&self, interval: usize) -> bool {
        interval > 0 && self.accepted_since_checkpoint >= interval
    }

    pub fn mark_checkpointed(&mut self) {
        self.accepted_since_checkpoint = 0;
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            tested: self.tested,
            accepted: self.accepted,
            rejected: self.rejected,
            failed: self.failed.len(),
            success_rate: success_rate(self.accepted, self.tested),
            assets: self.asset_map.len(),
            broken_local_links: 0,
        }
    }

    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        let accepted = self
            .accepted_records()
            .map(|r| AcceptedEntry {
                url: r.url.clone(),
                title: r.title.clone(),
                content_length: r.content_length,
                section: r.section.clone(),
                page_number: r.page_number,
                source: r.source,
                local_file: r.local_file.clone(),
                link_base: r.link_base.clone(),
            })
            .collect();

        let rejected = self
            .records
            .iter()
            .filter(|r| r.outcome == Outcome::Rejected)
            .map(|r| RejectedEntry {
                url: r.url.clone(),
                reason: r.reason.clone().unwrap_or_default(),
            })
            .collect();

        Snapshot {
            timestamp: Utc::now(),
            summary: SnapshotSummary {
                tested: self.tested,
                accepted: self.accepted,
                rejected: self.rejected,
                failed: self.failed.len(),
                success_rate: success_rate(self.accepted, self.tested),
            },
            accepted,
            rejected,
            failed: self.failed.clone(),
            sections: self.sections.values().cloned().collect(),
            pending: self.frontier.pending().map(str::to_string).collect(),
            asset_map: self.asset_map.clone(),
        }
    }

    /// Rebuild a state from a snapshot
    ///
    /// Every URL in the snapshot is marked visited, so nothing it lists is
    /// fetched again.
    #[must_use]
    pub fn restore(snapshot: Snapshot) -> Self {
        let mut state = Self::new();

        for entry in snapshot.accepted {
            state.frontier.mark_visited(entry.url.as_str());
            let record = state.ensure_record(&entry.url, entry.source);
            record.visited = true;
            record.outcome = Outcome::Accepted;
            record.title = entry.title;
            record.content_length = entry.content_length;
            record.section = entry.section;
            record.page_number = entry.page_number;
            record.local_file = entry.local_file.clone();
            record.link_base = entry.link_base;
            if let Some(file) = entry.local_file {
                state.page_files.insert(file, entry.url);
            }
        }

        for entry in snapshot.rejected {
            state.frontier.mark_visited(entry.url.as_str());
            let record = state.ensure_record(&entry.url, DiscoverySource::Link);
            record.visited = true;
            record.outcome = Outcome::Rejected;
            record.reason = Some(entry.reason);
        }

        for failed in &snapshot.failed {
            state.frontier.mark_visited(failed.url.as_str());
            let record = state.ensure_record(&failed.url, DiscoverySource::Link);
            record.visited = true;
            record.outcome = Outcome::Error;
            record.reason = Some(failed.reason.clone());
        }
        state.failed = snapshot.failed;

        state.sections = snapshot
            .sections
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        for url in &snapshot.pending {
            state.enqueue(url, DiscoverySource::Link);
        }

        state.asset_sequence = snapshot.asset_map.len();
        state.asset_map = snapshot.asset_map;

        state.tested = snapshot.summary.tested;
        state.accepted = snapshot.summary.accepted;
        state.rejected = snapshot.summary.rejected;

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_page(title: &str) -> FetchedPage {
        FetchedPage {
            status_code: Some(200),
            title: title.to_string(),
            text: "Fixtures and results".to_string(),
            html: "<html><body>Fixtures and results</body></html>".to_string(),
            ..FetchedPage::default()
        }
    }

    #[test]
    fn test_accepted_pages_build_sections() {
        let mut state = CrawlState::new();
        state.record_accepted("hist0304/", DiscoverySource::PatternGuess, &live_page("History"));
        state.record_accepted("hist0304/page2.html", DiscoverySource::PaginationGuess, &live_page("History 2"));
        state.record_accepted("hist0304/photos.html", DiscoverySource::Link, &live_page("Photos"));
        state.record_accepted("videos.html", DiscoverySource::Link, &live_page("Videos"));

        let section = state.section("hist0304").unwrap();
        assert!(section.directory);
        assert_eq!(section.accepted, 3);
        assert_eq!(section.base.as_deref(), Some("hist0304/"));
        assert_eq!(section.pages.keys().copied().collect::<Vec<_>>(), vec![0, 2]);

        assert!(!state.section("videos").unwrap().directory);
        assert_eq!(state.open_directory_sections(), vec!["hist0304".to_string()]);
    }

    #[test]
    fn test_counters_and_summary() {
        let mut state = CrawlState::new();
        state.record_accepted("a/", DiscoverySource::Link, &live_page("A"));
        state.record_rejected("b/", DiscoverySource::Link, "Empty content");
        state.record_failed("c/", DiscoverySource::Link, "timeout", 3);

        let summary = state.summary();
        assert_eq!(summary.tested, 3);
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.failed, 1);
        assert!((summary.success_rate - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_checkpoint_cadence() {
        let mut state = CrawlState::new();
        state.record_accepted("a/", DiscoverySource::Link, &live_page("A"));
        assert!(!state.checkpoint_due(2));
        state.record_accepted("b/", DiscoverySource::Link, &live_page("B"));
        assert!(state.checkpoint_due(2));
        state.mark_checkpointed();
        assert!(!state.checkpoint_due(2));
    }

    #[test]
    fn test_restore_marks_everything_visited() {
        let mut state = CrawlState::new();
        state.record_accepted("a/", DiscoverySource::Link, &live_page("A"));
        state.set_local_file("a/", "a.html");
        state.record_rejected("b/", DiscoverySource::PatternGuess, "HTTP 404");
        state.record_failed("c/", DiscoverySource::Link, "timeout", 3);
        state.map_asset("logo.gif", "../assets/images/img1_0a1b2c3d.gif".to_string());
        state.close_section("a");
        state.enqueue("d/", DiscoverySource::Link);

        let restored = CrawlState::restore(state.to_snapshot());

        for url in ["a/", "b/", "c/"] {
            assert!(restored.frontier().is_visited(url), "{url}");
        }
        assert_eq!(restored.record("a/").unwrap().local_file.as_deref(), Some("a.html"));
        assert_eq!(restored.asset_path("logo.gif"), state.asset_path("logo.gif"));
        assert_eq!(restored.next_asset_sequence(), 2);
        assert!(restored.section("a").unwrap().closed);
        assert_eq!(restored.frontier().pending().collect::<Vec<_>>(), vec!["d/"]);
        assert_eq!(restored.summary(), state.summary());
    }
}
