//! Test utilities shared by the sitemirror integration tests

use sitemirror::{AssetFetcher, FetchError, FetchOptions, FetchedPage, MirrorConfig, PageFetcher};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub const BASE: &str = "https://legacy.example.com/website/";

/// Absolute URL of a base-relative identifier
#[allow(dead_code)]
pub fn url(id: &str) -> String {
    format!("{BASE}{id}")
}

/// Builds a rendered page the way the browser snapshot script reports it
#[allow(dead_code)]
pub fn live_page(id: &str, title: &str, text: &str, links: &[&str], images: &[&str]) -> FetchedPage {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{href}\">link</a>\n"))
        .collect();
    let imgs: String = images
        .iter()
        .map(|src| format!("<img src=\"{src}\">\n"))
        .collect();

    FetchedPage {
        status_code: Some(200),
        final_url: url(id),
        title: title.to_string(),
        text: text.to_string(),
        html: format!(
            "<html><head><title>{title}</title></head><body><p>{text}</p>\n{anchors}{imgs}</body></html>"
        ),
        image_sources: images.iter().map(|s| (*s).to_string()).collect(),
        link_hrefs: links.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// The empty 200 page the legacy host serves for unknown URLs
#[allow(dead_code)]
pub fn soft_404(id: &str) -> FetchedPage {
    FetchedPage {
        status_code: Some(200),
        final_url: url(id),
        title: "Untitled".to_string(),
        text: String::new(),
        html: "<html><head><title>Untitled</title></head><body></body></html>".to_string(),
        ..FetchedPage::default()
    }
}

/// In-memory site keyed by absolute URL
///
/// Unknown URLs answer with a soft-404. A URL registered with `failing`
/// returns a navigation error that many times before its page is served.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockSite {
    pages: HashMap<String, FetchedPage>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, id: &str, page: FetchedPage) -> Self {
        self.pages.insert(url(id), page);
        self
    }

    /// Shorthand for a text page linking to `links`
    pub fn with_text_page(self, id: &str, title: &str, links: &[&str]) -> Self {
        let page = live_page(id, title, "Fixtures, results and club news", links, &[]);
        self.with_page(id, page)
    }

    pub fn failing(self, id: &str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(url(id), times);
        self
    }

    /// Every URL fetched, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, id: &str) -> usize {
        let target = url(id);
        self.calls.lock().unwrap().iter().filter(|u| **u == target).count()
    }
}

impl PageFetcher for MockSite {
    async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(left) = self.failures.lock().unwrap().get_mut(url)
            && *left > 0
        {
            *left -= 1;
            return Err(FetchError::Navigation("net::ERR_CONNECTION_RESET".to_string()));
        }

        let page = self.pages.get(url).cloned().unwrap_or_else(|| {
            let id = url.strip_prefix(BASE).unwrap_or(url);
            soft_404(id)
        });
        Ok(page)
    }
}

/// In-memory image host keyed by absolute URL; anything else is a 404
#[allow(dead_code)]
#[derive(Default)]
pub struct MockAssets {
    assets: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, absolute_url: &str, bytes: &[u8]) -> Self {
        self.assets.insert(absolute_url.to_string(), bytes.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AssetFetcher for MockAssets {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.assets.get(url).cloned().ok_or(FetchError::Http(404))
    }
}

/// Config for a fast, delay-free run into `storage`
#[allow(dead_code)]
pub fn test_config(storage: &Path) -> sitemirror::config::MirrorConfigBuilder<sitemirror::config::WithSiteBase> {
    MirrorConfig::builder()
        .storage_dir(storage)
        .site_base(BASE)
        .request_delay_ms(0)
        .retry_backoff_ms(0)
}

/// Read a mirrored page
#[allow(dead_code)]
pub fn read_page(storage: &Path, file: &str) -> String {
    std::fs::read_to_string(storage.join("pages").join(file))
        .unwrap_or_else(|e| panic!("missing pages/{file}: {e}"))
}
