//! Page and asset fetching
//!
//! The crawl engine only sees the `PageFetcher` and `AssetFetcher` traits.
//! `BrowserFetcher` renders pages through chromiumoxide and
//! `HttpAssetFetcher` downloads images with reqwest.

pub mod browser;
pub mod http;
pub mod page_timeout;
pub mod scripts;
pub mod types;

pub use browser::BrowserFetcher;
pub use http::HttpAssetFetcher;
pub use types::{FetchError, FetchOptions, FetchedPage, WaitCondition};

/// Renders a URL and reports what the browser saw
pub trait PageFetcher {
    fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>>;
}

/// Downloads the raw bytes of an asset
pub trait AssetFetcher {
    fn fetch_asset(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

impl<T: PageFetcher> PageFetcher for &T {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url, options).await
    }
}

impl<T: AssetFetcher> AssetFetcher for &T {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_asset(url).await
    }
}
