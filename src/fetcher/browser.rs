//! chromiumoxide-backed page fetcher
//!
//! One browser per run, one tab per fetch. Tabs are closed after the page
//! snapshot is taken so a long crawl does not accumulate targets.

use anyhow::Result;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::page_timeout::with_page_timeout;
use super::scripts::{PAGE_SNAPSHOT_SCRIPT, READY_STATE_SCRIPT};
use super::types::{FetchError, FetchOptions, FetchedPage, WaitCondition};
use super::PageFetcher;

/// Owns the browser process, its CDP handler task and its profile directory
pub struct BrowserFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserFetcher {
    /// Find or download Chrome and launch it
    pub async fn launch(headless: bool, chrome_data_dir: Option<PathBuf>) -> Result<Self> {
        let (browser, handler, user_data_dir) =
            crate::browser_setup::launch_browser(headless, chrome_data_dir).await?;

        Ok(Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        })
    }

    /// Close the browser, wait for the process to exit and remove its profile
    pub async fn shutdown(mut self) {
        info!(target: "sitemirror::browser", "Shutting down browser");

        if let Err(e) = self.browser.close().await {
            warn!(target: "sitemirror::browser", "Failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(target: "sitemirror::browser", "Failed to wait for browser exit: {e}");
        }

        self.handler.abort();
        self.cleanup_profile_dir();
    }

    /// Remove the Chrome profile directory
    ///
    /// Must run after `browser.wait()` so Chrome has released its file handles.
    fn cleanup_profile_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!(target: "sitemirror::browser", "Removing profile dir: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    target: "sitemirror::browser",
                    "Failed to remove profile dir {}: {e}",
                    path.display()
                );
            }
        }
    }

    async fn render(
        &self,
        page: &Page,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchedPage, FetchError> {
        with_page_timeout(
            async {
                page.goto(url)
                    .await
                    .map(|_| ())
                    .map_err(|e| FetchError::Navigation(e.to_string()))
            },
            options.timeout,
            "Page navigation",
        )
        .await?;

        with_page_timeout(
            async {
                page.wait_for_navigation()
                    .await
                    .map(|_| ())
                    .map_err(|e| FetchError::Navigation(e.to_string()))
            },
            options.timeout,
            "Page load",
        )
        .await?;

        if options.wait == WaitCondition::Settled {
            wait_until_settled(page, options.timeout).await;
        }

        let snapshot = page
            .evaluate(PAGE_SNAPSHOT_SCRIPT)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .into_value::<FetchedPage>()
            .map_err(|e| FetchError::Browser(format!("Malformed page snapshot: {e}")))?;

        Ok(snapshot)
    }
}

impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchedPage, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let result = self.render(&page, url, options).await;

        if let Err(e) = page.close().await {
            debug!(target: "sitemirror::browser", "Failed to close tab for {url}: {e}");
        }

        result
    }
}

impl Drop for BrowserFetcher {
    fn drop(&mut self) {
        self.handler.abort();

        if self.user_data_dir.is_some() {
            warn!(
                target: "sitemirror::browser",
                "BrowserFetcher dropped without shutdown() - removing profile dir in Drop"
            );
            self.cleanup_profile_dir();
        }
    }
}

/// Poll until the document is complete with its images loaded, or `max_wait`
/// elapses
///
/// Never fails: a page that does not settle is snapshotted as it is.
async fn wait_until_settled(page: &Page, max_wait: Duration) {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    while start.elapsed() < max_wait {
        match page.evaluate(READY_STATE_SCRIPT).await {
            Ok(result) => {
                if let Ok(value) = result.into_value::<serde_json::Value>() {
                    let complete = value.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let body = value.get("bodyExists").and_then(serde_json::Value::as_bool).unwrap_or(false);
                    let images = value.get("imagesLoaded").and_then(serde_json::Value::as_bool).unwrap_or(false);

                    if complete && body && images {
                        debug!(
                            target: "sitemirror::browser",
                            "Page settled after {:.2}s",
                            start.elapsed().as_secs_f64()
                        );
                        return;
                    }
                }
            }
            Err(e) => debug!(target: "sitemirror::browser", "readyState check failed: {e}"),
        }

        tokio::time::sleep(poll_interval).await;
    }

    debug!(target: "sitemirror::browser", "Page did not settle within {}s", max_wait.as_secs());
}
