//! Main mirror orchestration logic
//!
//! Coordinates one run over a single site:
//! - Seeding and draining the link frontier
//! - Pagination probing of every directory section
//! - Brute-forcing section names from the configured patterns
//! - Checkpointing on cadence, per closed section and at the end
//! - The post-crawl link rewrite and mirror link check

use anyhow::{Context, Result};
use log::{debug, info, warn};
use url::Url;

use super::candidates::{PaginationProbe, expand_section_names, section_dir_url};
use super::crawl_types::{DiscoverySource, RunSummary};
use super::liveness::LivenessClassifier;
use super::progress::{NoOpProgress, ProgressReporter};
use super::retry::{RetryPolicy, fetch_with_retry};
use super::state::CrawlState;
use crate::checkpoint::CheckpointStore;
use crate::config::MirrorConfig;
use crate::fetcher::{AssetFetcher, FetchOptions, FetchedPage, PageFetcher, WaitCondition};
use crate::mirror::{LinkRewriter, MirrorWriter, check_mirror_links};
use crate::utils::UrlNormalizer;

/// A configured mirror run over one site
///
/// Fetching is strictly sequential: one page, then its images, then the next
/// page. All mutable progress lives in the `CrawlState` passed through the
/// run, so the same `SiteMirror` can drive a fresh or a restored state.
pub struct SiteMirror<P, A, R = NoOpProgress> {
    config: MirrorConfig,
    normalizer: UrlNormalizer,
    fetcher: P,
    writer: MirrorWriter<A>,
    classifier: LivenessClassifier,
    checkpoints: CheckpointStore,
    retry: RetryPolicy,
    progress: R,
}

impl<P: PageFetcher, A: AssetFetcher> SiteMirror<P, A> {
    /// Create a run with a no-op progress reporter
    pub fn new(config: MirrorConfig, fetcher: P, assets: A) -> Result<Self> {
        let normalizer = UrlNormalizer::new(config.site_base())
            .with_context(|| format!("Invalid site base: {}", config.site_base()))?;

        Ok(Self {
            normalizer,
            fetcher,
            writer: MirrorWriter::new(assets, &config),
            classifier: LivenessClassifier::from_config(&config),
            checkpoints: CheckpointStore::new(config.checkpoint_path()),
            retry: RetryPolicy::from_config(&config),
            progress: NoOpProgress,
            config,
        })
    }
}

impl<P, A, R> SiteMirror<P, A, R> {
    /// Replace the progress reporter
    pub fn with_progress<R2: ProgressReporter>(self, progress: R2) -> SiteMirror<P, A, R2> {
        SiteMirror {
            config: self.config,
            normalizer: self.normalizer,
            fetcher: self.fetcher,
            writer: self.writer,
            classifier: self.classifier,
            checkpoints: self.checkpoints,
            retry: self.retry,
            progress,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    #[must_use]
    pub fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }
}

impl<P, A, R> SiteMirror<P, A, R>
where
    P: PageFetcher,
    A: AssetFetcher,
    R: ProgressReporter,
{
    /// Run to completion, resuming from the checkpoint when configured
    pub async fn run(&self) -> Result<RunSummary> {
        let mut state = self.initial_state().await;
        self.run_with_state(&mut state).await
    }

    /// Restored state when resuming and a usable checkpoint exists
    pub async fn initial_state(&self) -> CrawlState {
        if !self.config.resume() {
            return CrawlState::new();
        }

        match self.checkpoints.load().await {
            Some(snapshot) => CrawlState::restore(snapshot),
            None => CrawlState::new(),
        }
    }

    /// Run all phases over `state`
    ///
    /// Only I/O failures on the output directory abort the run; page and
    /// image failures are recorded and the run carries on.
    pub async fn run_with_state(&self, state: &mut CrawlState) -> Result<RunSummary> {
        info!(
            target: "sitemirror::mirror",
            "Mirroring {} into {}",
            self.config.site_base(),
            self.config.storage_dir().display()
        );

        self.writer.prepare().await?;

        for seed in self.config.seeds() {
            let Some(id) = self.seed_id(seed) else {
                warn!(target: "sitemirror::links", "Seed outside {}: {seed}", self.config.site_base());
                continue;
            };
            if self.config.is_excluded(&id) {
                debug!(target: "sitemirror::links", "Seed excluded: {seed}");
                continue;
            }
            state.enqueue(&id, DiscoverySource::Link);
        }

        self.crawl_and_paginate(state).await?;
        self.brute_force_sections(state).await?;
        self.checkpoint(state).await?;

        let rewriter = LinkRewriter::from_state(
            &self.normalizer,
            state,
            self.config.old_domains(),
            self.config.rewrite_local_links(),
            self.config.strip_site_base_links(),
        );
        if rewriter.is_active() {
            rewriter.rewrite_mirror(self.writer.pages_dir()).await?;
        }

        let broken = check_mirror_links(self.writer.pages_dir()).await?;
        for link in &broken {
            debug!(target: "sitemirror::links", "Broken link in {}: {}", link.page, link.href);
        }
        if !broken.is_empty() {
            warn!(
                target: "sitemirror::links",
                "{} local links point at pages that were not mirrored",
                broken.len()
            );
        }

        let mut summary = state.summary();
        summary.broken_local_links = broken.len();

        self.progress.report_completed(&summary);
        info!(
            target: "sitemirror::mirror",
            "Run complete: {} tested, {} accepted, {} rejected, {} failed, {}% success, {} images",
            summary.tested,
            summary.accepted,
            summary.rejected,
            summary.failed,
            summary.success_rate,
            summary.assets
        );

        Ok(summary)
    }

    /// Identifier of a configured seed; an empty seed is the site base itself
    fn seed_id(&self, seed: &str) -> Option<String> {
        if seed.trim().is_empty() {
            return Some(String::new());
        }
        self.normalizer.normalize(seed, "")
    }

    /// Drain the frontier, then paginate open sections until neither yields
    /// anything new
    async fn crawl_and_paginate(&self, state: &mut CrawlState) -> Result<()> {
        loop {
            self.drain(state).await?;

            let open = state.open_directory_sections();
            if open.is_empty() {
                return Ok(());
            }

            for section in open {
                self.paginate(state, &section).await?;
            }
        }
    }

    async fn drain(&self, state: &mut CrawlState) -> Result<()> {
        while let Some(id) = state.frontier_mut().next() {
            self.visit_link(state, &id).await?;
        }
        Ok(())
    }

    /// Fetch a link-discovered page with whole-page retry
    async fn visit_link(&self, state: &mut CrawlState, id: &str) -> Result<()> {
        let source = state.record(id).map_or(DiscoverySource::Link, |r| r.source);

        let url = match self.normalizer.absolute(id) {
            Ok(url) => url,
            Err(e) => {
                state.record_rejected(id, source, &format!("Invalid URL: {e}"));
                self.progress.report_page_tested(id, source, false);
                return Ok(());
            }
        };

        self.pause().await;
        let options = FetchOptions::new(self.config.page_load_timeout()).with_wait(WaitCondition::Settled);
        let retried = fetch_with_retry(&self.fetcher, url.as_str(), &options, &self.retry).await;

        match retried.result {
            Ok(page) => {
                self.handle_fetched(state, id, source, page).await?;
            }
            Err(e) if !e.is_transient() => {
                state.record_rejected(id, source, &e.to_string());
                self.progress.report_page_tested(id, source, false);
            }
            Err(e) => {
                let reason = e.to_string();
                state.record_failed(id, source, &reason, retried.attempts);
                self.progress.report_error(id, &reason);
            }
        }
        Ok(())
    }

    /// Fetch a guessed URL once; true when it was accepted
    ///
    /// A candidate that was already visited is not fetched again; its
    /// recorded outcome stands. A candidate already queued by a link is
    /// fetched now as that link, keeping its whole-page retry.
    async fn probe(&self, state: &mut CrawlState, id: &str, source: DiscoverySource) -> Result<bool> {
        if self.config.is_excluded(id) {
            return Ok(false);
        }

        let queued = state.frontier().is_queued(id);
        if !state.frontier_mut().claim(id) {
            return Ok(state.record(id).is_some_and(|r| r.is_accepted()));
        }

        if queued {
            self.visit_link(state, id).await?;
            return Ok(state.record(id).is_some_and(|r| r.is_accepted()));
        }

        let url = match self.normalizer.absolute(id) {
            Ok(url) => url,
            Err(e) => {
                state.record_rejected(id, source, &format!("Invalid URL: {e}"));
                return Ok(false);
            }
        };

        self.pause().await;
        let options = FetchOptions::new(self.config.probe_timeout());
        match self.fetcher.fetch(url.as_str(), &options).await {
            Ok(page) => self.handle_fetched(state, id, source, page).await,
            Err(e) => {
                let verdict = self.classifier.classify(&Err(e));
                state.record_rejected(id, source, verdict.reason.as_deref().unwrap_or_default());
                self.progress.report_page_tested(id, source, false);
                Ok(false)
            }
        }
    }

    /// Classify a fetched page; accepted pages feed the frontier and the mirror
    async fn handle_fetched(
        &self,
        state: &mut CrawlState,
        id: &str,
        source: DiscoverySource,
        page: FetchedPage,
    ) -> Result<bool> {
        let verdict = self.classifier.classify_page(&page);
        self.progress.report_page_tested(id, source, verdict.is_live);

        if !verdict.is_live {
            state.record_rejected(id, source, verdict.reason.as_deref().unwrap_or_default());
            return Ok(false);
        }

        state.record_accepted(id, source, &page);

        // Relative links resolve against where the browser actually landed
        let landed = Url::parse(&page.final_url).ok();
        let current_id = landed
            .as_ref()
            .and_then(|url| self.normalizer.relativize(url))
            .unwrap_or_else(|| id.to_string());
        state.set_link_base(id, &current_id);

        let mut discovered = 0;
        for href in &page.link_hrefs {
            if let Some(target) = self.normalizer.normalize(href, &current_id)
                && !self.config.is_excluded(&target)
                && state.enqueue(&target, DiscoverySource::Link)
            {
                discovered += 1;
            }
        }
        if discovered > 0 {
            debug!(target: "sitemirror::links", "{id}: {discovered} new links queued");
        }

        let page_url = match landed {
            Some(url) => url,
            None => self.normalizer.absolute(id)?,
        };
        self.writer.write_page(state, id, &page_url, &page).await?;

        if state.checkpoint_due(self.config.checkpoint_interval()) {
            self.checkpoint(state).await?;
        }

        Ok(true)
    }

    /// Walk `section/pageN.html` until the probe stops, then close the section
    ///
    /// A name with nothing accepted under it leaves no section behind.
    async fn paginate(&self, state: &mut CrawlState, section: &str) -> Result<()> {
        let already_accepted = state.section(section).map_or(0, |s| s.accepted);
        let mut probe = PaginationProbe::from_config(section, already_accepted, &self.config);

        while let Some((n, id)) = probe.next_candidate() {
            let accepted = self.probe(state, &id, DiscoverySource::PaginationGuess).await?;
            debug!(target: "sitemirror::links", "{section} page {n}: {}", if accepted { "hit" } else { "miss" });
            probe.record(accepted);
        }

        if state.section(section).is_none() {
            return Ok(());
        }

        state.close_section(section);
        self.progress.report_section_closed(section, probe.accepted());
        self.checkpoint(state).await
    }

    /// Probe every configured section name as `name/`, paginating each one
    async fn brute_force_sections(&self, state: &mut CrawlState) -> Result<()> {
        let names = expand_section_names(self.config.section_patterns());
        if names.is_empty() {
            return Ok(());
        }

        info!(target: "sitemirror::mirror", "Probing {} section names", names.len());

        for name in names {
            let id = section_dir_url(&name);
            if state.frontier().is_visited(&id) {
                continue;
            }

            if self.probe(state, &id, DiscoverySource::PatternGuess).await? {
                info!(target: "sitemirror::mirror", "Found section {name}");
            } else if state.section(&name).is_none() {
                // No index page, but numbered pages may still exist
                self.paginate(state, &name).await?;
            }
            self.crawl_and_paginate(state).await?;
        }
        Ok(())
    }

    async fn checkpoint(&self, state: &mut CrawlState) -> Result<()> {
        let snapshot = state.to_snapshot();
        self.checkpoints.save(&snapshot).await?;
        state.mark_checkpointed();
        self.progress.report_checkpoint_saved(snapshot.summary.accepted);
        Ok(())
    }

    async fn pause(&self) {
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
