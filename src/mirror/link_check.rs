//! Broken-link report for a written mirror

use anyhow::{Context, Result};
use log::{info, warn};
use scraper::{Html, Selector};
use std::path::Path;

/// Relative `.html` link whose target file does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    /// Page containing the link
    pub page: String,
    pub href: String,
}

fn is_local_html_link(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with('/') || href.contains("://") {
        return false;
    }
    if href.contains(':') {
        // mailto:, javascript: and the like
        return false;
    }

    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.to_ascii_lowercase().ends_with(".html")
}

fn broken_links_in(page: &str, html: &str, pages_dir: &Path) -> Vec<BrokenLink> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href], area[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| is_local_html_link(href))
        .filter(|href| {
            let path = href.split(['?', '#']).next().unwrap_or_default();
            !pages_dir.join(path).exists()
        })
        .map(|href| BrokenLink {
            page: page.to_string(),
            href: href.to_string(),
        })
        .collect()
}

/// Scan every `*.html` file in `pages_dir` for relative links to missing pages
pub async fn check_mirror_links(pages_dir: &Path) -> Result<Vec<BrokenLink>> {
    let mut entries = tokio::fs::read_dir(pages_dir)
        .await
        .with_context(|| format!("Failed to read pages directory: {}", pages_dir.display()))?;

    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("html")) {
            pages.push(path);
        }
    }
    pages.sort();

    let mut broken = Vec::new();
    for path in &pages {
        let html = match tokio::fs::read_to_string(path).await {
            Ok(html) => html,
            Err(e) => {
                warn!(target: "sitemirror::links", "Cannot read {}: {e}", path.display());
                continue;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        broken.extend(broken_links_in(&name, &html, pages_dir));
    }

    info!(
        target: "sitemirror::links",
        "Checked {} pages: {} broken local links",
        pages.len(),
        broken.len()
    );
    Ok(broken)
}
