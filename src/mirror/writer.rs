//! Persists accepted pages and their images
//!
//! Images are stored once per distinct source string. The source to local
//! path mapping lives in `CrawlState`, so a logo repeated on every page is
//! downloaded once and rewritten identically everywhere, including across
//! resumed runs.

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use lol_html::{HtmlRewriter, Settings, element};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::naming::{asset_filename, disambiguated_page_filename, page_filename};
use crate::config::MirrorConfig;
use crate::crawl_engine::state::CrawlState;
use crate::fetcher::{AssetFetcher, FetchedPage};
use crate::utils::IMAGES_DIR;

/// Result of mirroring one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredPage {
    /// Filename under `pages/`
    pub local_file: String,
    /// Images newly stored for this page
    pub assets_stored: usize,
    /// Images that could not be fetched and keep their original reference
    pub assets_failed: usize,
}

pub struct MirrorWriter<A> {
    assets: A,
    pages_dir: PathBuf,
    images_dir: PathBuf,
    default_image_extension: String,
    request_delay: Duration,
}

impl<A: AssetFetcher> MirrorWriter<A> {
    pub fn new(assets: A, config: &MirrorConfig) -> Self {
        Self {
            assets,
            pages_dir: config.pages_dir(),
            images_dir: config.images_dir(),
            default_image_extension: config.default_image_extension().to_string(),
            request_delay: config.request_delay(),
        }
    }

    #[must_use]
    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Create `pages/` and `assets/images/`
    pub async fn prepare(&self) -> Result<()> {
        for dir in [&self.pages_dir, &self.images_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Store the page's images, rewrite their references and write the page
    ///
    /// Image failures are logged and leave the reference untouched; only
    /// write failures on the output directory are errors.
    pub async fn write_page(
        &self,
        state: &mut CrawlState,
        id: &str,
        page_url: &Url,
        page: &FetchedPage,
    ) -> Result<MirroredPage> {
        let mut assets_stored = 0;
        let mut assets_failed = 0;

        let mut seen = HashSet::new();
        let sources: Vec<&str> = page
            .image_sources
            .iter()
            .map(String::as_str)
            .filter(|src| !src.trim().is_empty() && seen.insert(*src))
            .collect();

        for source in &sources {
            if state.asset_path(source).is_some() || source.trim_start().starts_with("data:") {
                continue;
            }

            if self.store_asset(state, page_url, source).await? {
                assets_stored += 1;
            } else {
                assets_failed += 1;
            }
        }

        let html = match rewrite_asset_references(&page.html, state) {
            Ok(html) => html,
            Err(e) => {
                warn!(target: "sitemirror::mirror", "Keeping image references of {id}: {e:#}");
                page.html.clone()
            }
        };

        let mut local_file = page_filename(id);
        if let Some(owner) = state.page_file_owner(&local_file)
            && owner != id
        {
            let renamed = disambiguated_page_filename(id);
            warn!(
                target: "sitemirror::mirror",
                "{id} and {owner} both map to {local_file}; writing {renamed}"
            );
            local_file = renamed;
        }

        let path = self.pages_dir.join(&local_file);
        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("Failed to write page: {}", path.display()))?;
        state.set_local_file(id, &local_file);

        debug!(
            target: "sitemirror::mirror",
            "Wrote {local_file} ({assets_stored} new images, {assets_failed} failed)"
        );

        Ok(MirroredPage {
            local_file,
            assets_stored,
            assets_failed,
        })
    }

    /// Fetch and store one image; `Ok(false)` when it could not be fetched
    async fn store_asset(&self, state: &mut CrawlState, page_url: &Url, source: &str) -> Result<bool> {
        let absolute = match page_url.join(source.trim()) {
            Ok(url) => url,
            Err(e) => {
                warn!(target: "sitemirror::mirror", "Skipping image '{source}': {e}");
                return Ok(false);
            }
        };

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let bytes = match self.assets.fetch_asset(absolute.as_str()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(target: "sitemirror::mirror", "Failed to download image {absolute}: {e}");
                return Ok(false);
            }
        };

        let filename = asset_filename(
            state.next_asset_sequence(),
            source,
            &self.default_image_extension,
        );
        let path = self.images_dir.join(&filename);
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write image: {}", path.display()))?;

        state.map_asset(source, format!("../{IMAGES_DIR}/{filename}"));
        Ok(true)
    }
}

/// Point every `<img src>` whose whole value is a stored source at its local copy
///
/// Sources that were never stored keep their original value.
pub fn rewrite_asset_references(html: &str, state: &CrawlState) -> Result<String> {
    let mut output = Vec::with_capacity(html.len());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(local) = el
                    .get_attribute("src")
                    .and_then(|src| state.asset_path(&src).map(str::to_string))
                {
                    el.set_attribute("src", &local)?;
                }
                Ok(())
            })],
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

    String::from_utf8(output).context("Invalid UTF-8 in rewritten HTML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mapped_sources_are_rewritten() {
        let mut state = CrawlState::new();
        state.map_asset("images/a.gif", "../assets/images/img1_aaaaaaaa.gif".to_string());

        let html = r#"<img src="images/a.gif"><img src="images/b.gif"><img src="images/a.gif">"#;
        let out = rewrite_asset_references(html, &state).unwrap();

        assert_eq!(
            out,
            r#"<img src="../assets/images/img1_aaaaaaaa.gif"><img src="images/b.gif"><img src="../assets/images/img1_aaaaaaaa.gif">"#
        );
    }

    #[test]
    fn test_unstored_source_containing_a_stored_one_is_kept() {
        let mut state = CrawlState::new();
        state.map_asset("logo.gif", "../assets/images/img1_11111111.gif".to_string());

        let html = r#"<img src="oldlogo.gif"><img src="logo.gif"><p>logo.gif</p>"#;
        let out = rewrite_asset_references(html, &state).unwrap();

        assert_eq!(
            out,
            r#"<img src="oldlogo.gif"><img src="../assets/images/img1_11111111.gif"><p>logo.gif</p>"#
        );
    }
}
