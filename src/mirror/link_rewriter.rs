//! Post-crawl link rewriting for the offline mirror
//!
//! Pages are written as soon as they are accepted, before the rest of the
//! site is known. Once the crawl is over every `<a href>` and `<area href>`
//! pointing at another mirrored page is rewritten to that page's local
//! filename. The same streaming pass drops links into retired domains and
//! turns absolute links into the site base into mirror-relative ones.

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use lol_html::{HtmlRewriter, Settings, element};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

use super::naming::page_filename;
use crate::crawl_engine::state::CrawlState;
use crate::utils::UrlNormalizer;

/// Counts of edits made by a rewrite
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    /// Links pointed at a mirrored page
    pub local: usize,
    /// Absolute site-base links made relative
    pub stripped: usize,
    /// Links into old domains removed
    pub removed: usize,
}

impl RewriteStats {
    fn add(&mut self, other: RewriteStats) {
        self.local += other.local;
        self.stripped += other.stripped;
        self.removed += other.removed;
    }
}

enum LinkEdit {
    Set(String),
    Remove,
}

pub struct LinkRewriter<'a> {
    normalizer: &'a UrlNormalizer,
    /// Page identifier to its filename under `pages/`
    local_files: HashMap<String, String>,
    /// Redirected pages: identifier to the identifier their links resolve against
    link_bases: HashMap<String, String>,
    old_domains: Vec<String>,
    rewrite_local_links: bool,
    strip_site_base_links: bool,
}

impl<'a> LinkRewriter<'a> {
    #[must_use]
    pub fn new(
        normalizer: &'a UrlNormalizer,
        local_files: HashMap<String, String>,
        old_domains: &[String],
        rewrite_local_links: bool,
        strip_site_base_links: bool,
    ) -> Self {
        Self {
            normalizer,
            local_files,
            link_bases: HashMap::new(),
            old_domains: old_domains
                .iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            rewrite_local_links,
            strip_site_base_links,
        }
    }

    /// Build the filename map from every mirrored page in `state`
    #[must_use]
    pub fn from_state(
        normalizer: &'a UrlNormalizer,
        state: &CrawlState,
        old_domains: &[String],
        rewrite_local_links: bool,
        strip_site_base_links: bool,
    ) -> Self {
        let local_files = state
            .accepted_records()
            .filter_map(|r| r.local_file.as_ref().map(|f| (r.url.clone(), f.clone())))
            .collect();

        Self::new(
            normalizer,
            local_files,
            old_domains,
            rewrite_local_links,
            strip_site_base_links,
        )
        .with_link_bases(
            state
                .accepted_records()
                .filter_map(|r| r.link_base.as_ref().map(|base| (r.url.clone(), base.clone())))
                .collect(),
        )
    }

    /// Resolve the links of redirected pages against where they landed
    #[must_use]
    pub fn with_link_bases(mut self, link_bases: HashMap<String, String>) -> Self {
        self.link_bases = link_bases;
        self
    }

    /// Anything to do at all
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.rewrite_local_links || self.strip_site_base_links || !self.old_domains.is_empty()
    }

    fn is_old_domain(&self, href: &str) -> bool {
        let href = href.to_ascii_lowercase();
        self.old_domains.iter().any(|domain| href.contains(domain.as_str()))
    }

    fn edit_for(&self, href: Option<String>, page_id: &str, stats: &Cell<RewriteStats>) -> Option<LinkEdit> {
        let href = href?;
        let mut counts = stats.get();

        let edit = if self.is_old_domain(&href) {
            counts.removed += 1;
            Some(LinkEdit::Remove)
        } else {
            let target = self.normalizer.normalize(&href, page_id)?;
            match self.local_files.get(&target) {
                Some(file) if self.rewrite_local_links && *file != href => {
                    counts.local += 1;
                    Some(LinkEdit::Set(file.clone()))
                }
                _ if self.strip_site_base_links && is_absolute_href(&href) => {
                    counts.stripped += 1;
                    Some(LinkEdit::Set(page_filename(&target)))
                }
                _ => None,
            }
        };

        stats.set(counts);
        edit
    }

    /// Rewrite the links of one page identified by `page_id`
    pub fn rewrite_html(&self, html: &str, page_id: &str) -> Result<(String, RewriteStats)> {
        let mut output = Vec::with_capacity(html.len());
        let stats = Cell::new(RewriteStats::default());

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("a[href]", |el| {
                        match self.edit_for(el.get_attribute("href"), page_id, &stats) {
                            Some(LinkEdit::Set(value)) => el.set_attribute("href", &value)?,
                            Some(LinkEdit::Remove) => el.remove_attribute("href"),
                            None => {}
                        }
                        Ok(())
                    }),
                    // Image-map hotspots of the legacy navigation bar
                    element!("area[href]", |el| {
                        match self.edit_for(el.get_attribute("href"), page_id, &stats) {
                            Some(LinkEdit::Set(value)) => el.set_attribute("href", &value)?,
                            Some(LinkEdit::Remove) => el.remove_attribute("href"),
                            None => {}
                        }
                        Ok(())
                    }),
                ],
                ..Settings::default()
            },
            |c: &[u8]| output.extend_from_slice(c),
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| anyhow!("HTML rewrite error: {e}"))?;
        rewriter
            .end()
            .map_err(|e| anyhow!("HTML rewrite finalization error: {e}"))?;

        let result = String::from_utf8(output).context("Invalid UTF-8 in rewritten HTML")?;
        Ok((result, stats.get()))
    }

    /// Rewrite every mirrored page in place
    ///
    /// A page that cannot be read or parsed is skipped with a warning; write
    /// failures are errors.
    pub async fn rewrite_mirror(&self, pages_dir: &Path) -> Result<RewriteStats> {
        let mut total = RewriteStats::default();

        for (page_id, file) in &self.local_files {
            let path = pages_dir.join(file);
            let html = match tokio::fs::read_to_string(&path).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(target: "sitemirror::links", "Cannot read {}: {e}", path.display());
                    continue;
                }
            };

            let base = self.link_bases.get(page_id).unwrap_or(page_id);
            let (rewritten, stats) = match self.rewrite_html(&html, base) {
                Ok(result) => result,
                Err(e) => {
                    warn!(target: "sitemirror::links", "Cannot rewrite {}: {e:#}", path.display());
                    continue;
                }
            };

            if rewritten != html {
                tokio::fs::write(&path, rewritten)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                debug!(target: "sitemirror::links", "Rewrote links in {file}: {stats:?}");
            }
            total.add(stats);
        }

        info!(
            target: "sitemirror::links",
            "Link rewrite: {} local, {} site-base stripped, {} old-domain removed",
            total.local,
            total.stripped,
            total.removed
        );
        Ok(total)
    }
}

fn is_absolute_href(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}
