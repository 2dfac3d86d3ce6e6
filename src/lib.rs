pub mod browser_setup;
pub mod checkpoint;
pub mod config;
pub mod crawl_engine;
pub mod fetcher;
pub mod mirror;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use checkpoint::{CheckpointStore, Snapshot};
pub use config::MirrorConfig;
pub use crawl_engine::{
    CrawlState, DiscoverySource, LogProgress, MirrorError, MirrorResult, NamePattern, NoOpProgress,
    ProgressReporter, RunSummary, SiteMirror,
};
pub use fetcher::{
    AssetFetcher, BrowserFetcher, FetchError, FetchOptions, FetchedPage, HttpAssetFetcher,
    PageFetcher, WaitCondition,
};
pub use mirror::{LinkRewriter, MirrorWriter, check_mirror_links};
pub use utils::UrlNormalizer;

/// Mirror a site with a real browser and an HTTP image fetcher
///
/// Launches Chrome (downloading Chromium when none is installed), runs to
/// completion with console progress and always shuts the browser down.
pub async fn mirror_site(config: MirrorConfig) -> MirrorResult<RunSummary> {
    let browser = BrowserFetcher::launch(config.headless(), config.chrome_data_dir().cloned())
        .await
        .map_err(|e| MirrorError::Browser(format!("{e:#}")))?;
    let assets = HttpAssetFetcher::new(config.asset_timeout(), config.max_asset_bytes());

    let outcome = match SiteMirror::new(config, &browser, assets) {
        Ok(mirror) => mirror.with_progress(LogProgress).run().await,
        Err(e) => Err(e),
    };

    browser.shutdown().await;
    Ok(outcome?)
}
